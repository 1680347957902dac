//! Deterministic staff name generation using curated name lists.
//!
//! Same RNG seed = same names, so demo tenants are reproducible.

use crate::rng::DemoRng;

pub struct NameGenerator;

impl NameGenerator {
    /// Generate a full name (first + last) deterministically
    pub fn generate_full_name(rng: &mut DemoRng) -> String {
        let first = rng.pick(Self::first_names());
        let last = rng.pick(Self::last_names());
        format!("{first} {last}")
    }

    /// Lower-case `first.last@domain` address for a generated name.
    pub fn email_for(full_name: &str, domain: &str, disambiguator: usize) -> String {
        let local = full_name
            .split_whitespace()
            .map(|part| part.to_lowercase())
            .collect::<Vec<_>>()
            .join(".");
        format!("{local}{disambiguator}@{domain}")
    }

    fn first_names() -> &'static [&'static str] {
        &[
            "Aisha", "Alex", "Amara", "Anders", "Ben", "Carmen", "Chen", "Chloe", "Daniel",
            "Dev", "Elena", "Emeka", "Farah", "Felix", "Grace", "Hana", "Hugo", "Imogen",
            "Isaac", "Jun", "Kai", "Laila", "Liam", "Maya", "Mateo", "Nadia", "Noah", "Olu",
            "Priya", "Rafael", "Rhea", "Sam", "Sofia", "Tariq", "Thea", "Uma", "Victor",
            "Wen", "Yusuf", "Zara",
        ]
    }

    fn last_names() -> &'static [&'static str] {
        &[
            "Abbott", "Adeyemi", "Bauer", "Brennan", "Castillo", "Chowdhury", "Dalton",
            "Eriksen", "Fischer", "Gallagher", "Haddad", "Ito", "Jansen", "Kaur", "Kowalski",
            "Lam", "Mensah", "Moreau", "Nakamura", "Novak", "Okafor", "Patel", "Quinn",
            "Rossi", "Santos", "Schmidt", "Tanaka", "Tran", "Varga", "Walsh", "Wright",
            "Yilmaz",
        ]
    }
}
