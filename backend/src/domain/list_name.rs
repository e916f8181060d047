//! Generated names for lists started without one.

use rand::Rng;
use rand::seq::SliceRandom;

const WORDS_PER_NAME: usize = 3;

const WORDS: &[&str] = &[
    "acorn", "amber", "anchor", "apple", "arrow", "aspen", "badger", "basil", "beacon", "birch",
    "bramble", "breeze", "brook", "cedar", "cider", "clover", "comet", "copper", "coral", "cricket",
    "daisy", "dawn", "delta", "ember", "fable", "falcon", "fern", "fig", "flint", "garnet",
    "ginger", "harbor", "hazel", "heron", "honey", "indigo", "iris", "ivy", "jasper", "juniper",
    "kestrel", "lantern", "lemon", "lilac", "linen", "maple", "meadow", "mint", "moss", "nutmeg",
    "oak", "olive", "orbit", "otter", "pebble", "pepper", "pine", "plum", "quartz", "quill",
    "raven", "river", "robin", "saffron", "sage", "slate", "sparrow", "spruce", "thistle",
    "tulip", "velvet", "violet", "willow", "wren", "yarrow", "zephyr",
];

/// Pick a three-word, title-cased list name such as `"Maple Otter Quill"`.
pub fn generate_list_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    WORDS
        .choose_multiple(rng, WORDS_PER_NAME)
        .map(|word| capitalise(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rstest::rstest;

    #[rstest]
    fn generated_names_have_three_capitalised_words() {
        let mut rng = SmallRng::seed_from_u64(7);
        let name = generate_list_name(&mut rng);
        let words: Vec<&str> = name.split(' ').collect();

        assert_eq!(words.len(), WORDS_PER_NAME);
        for word in words {
            let first = word.chars().next().expect("non-empty word");
            assert!(first.is_uppercase(), "{word} should be capitalised");
            assert!(WORDS.contains(&word.to_lowercase().as_str()));
        }
    }

    #[rstest]
    fn generated_names_do_not_repeat_words() {
        let mut rng = SmallRng::seed_from_u64(11);
        let name = generate_list_name(&mut rng);
        let mut words: Vec<&str> = name.split(' ').collect();
        words.sort_unstable();
        words.dedup();
        assert_eq!(words.len(), WORDS_PER_NAME);
    }

    #[rstest]
    #[case("maple", "Maple")]
    #[case("", "")]
    fn capitalise_uppercases_first_letter(#[case] word: &str, #[case] expected: &str) {
        assert_eq!(capitalise(word), expected);
    }
}
