//! Random nickname generation for newly registered accounts.

use rand::seq::SliceRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "clever", "jolly", "brave", "sly", "gentle", "swift", "quiet", "bold", "lucky", "witty",
];

const ANIMALS: &[&str] = &[
    "panda", "fox", "raccoon", "koala", "lion", "otter", "falcon", "badger", "heron", "lynx",
];

/// Build a nickname like `cleverfox421`.
///
/// Always alphanumeric and within the nickname length bounds; uniqueness is
/// the caller's concern.
pub fn generate_nickname() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("happy");
    let animal = ANIMALS.choose(&mut rng).copied().unwrap_or("cat");
    let number: u16 = rng.gen_range(0..1000);
    format!("{}{}{}", adjective, animal, number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_nickname;

    #[test]
    fn test_generated_nicknames_are_valid() {
        for _ in 0..100 {
            let nickname = generate_nickname();
            assert!(validate_nickname(&nickname).is_ok(), "{nickname}");
        }
    }
}
