//! Deterministic contact and company names for synthetic pipelines.
//!
//! Same RNG stream in, same names out.

use crate::rng::SeededRng;

pub struct NameGenerator;

impl NameGenerator {
    /// Contact name, first + last.
    pub fn contact_name(rng: &mut SeededRng) -> String {
        format!("{} {}", rng.pick(Self::first_names()), rng.pick(Self::last_names()))
    }

    /// Company name, "Prefix Trade Suffix" or "Surname Trade Suffix".
    pub fn company_name(rng: &mut SeededRng) -> String {
        let trade = rng.pick(Self::trades());
        let suffix = rng.pick(Self::company_suffixes());
        if rng.chance(0.5) {
            format!("{} {trade} {suffix}", rng.pick(Self::company_prefixes()))
        } else {
            format!("{} {trade} {suffix}", rng.pick(Self::last_names()))
        }
    }

    pub fn industry(rng: &mut SeededRng) -> &'static str {
        *rng.pick(Self::industries())
    }

    pub fn industries() -> &'static [&'static str] {
        &[
            "Construction", "Healthcare", "Manufacturing", "Logistics",
            "Real Estate", "Retail", "Software", "Hospitality",
        ]
    }

    fn first_names() -> &'static [&'static str] {
        &[
            "James", "Mary", "Robert", "Patricia", "Michael", "Jennifer", "David",
            "Linda", "William", "Elizabeth", "Daniel", "Susan", "Matthew", "Jessica",
            "Anthony", "Sarah", "Mark", "Karen", "Steven", "Nancy", "Andrew", "Lisa",
            "Joshua", "Betty", "Kevin", "Sandra", "Brian", "Ashley", "George", "Emily",
            "Ryan", "Michelle", "Jacob", "Amanda", "Nicholas", "Melissa", "Eric",
            "Rebecca", "Samuel", "Laura", "Priya", "Wei", "Omar", "Sofia", "Mateo",
            "Aisha", "Kenji", "Ines", "Tariq", "Yara",
        ]
    }

    fn last_names() -> &'static [&'static str] {
        &[
            "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller",
            "Davis", "Rodriguez", "Martinez", "Hernandez", "Lopez", "Wilson",
            "Anderson", "Thomas", "Taylor", "Moore", "Jackson", "Martin", "Lee",
            "Perez", "Thompson", "White", "Harris", "Clark", "Lewis", "Walker",
            "Young", "Allen", "King", "Wright", "Scott", "Nguyen", "Hill", "Flores",
            "Patel", "Chen", "Kim", "Okafor", "Haddad",
        ]
    }

    fn company_prefixes() -> &'static [&'static str] {
        &[
            "Premier", "Summit", "Northwind", "Keystone", "Harbor", "Pinnacle",
            "Metro", "Valley", "Coastal", "Central", "United", "Evergreen",
        ]
    }

    fn company_suffixes() -> &'static [&'static str] {
        &["LLC", "Inc", "Corp", "Group", "Partners", "Holdings", "Co"]
    }

    fn trades() -> &'static [&'static str] {
        &[
            "Roofing", "Property", "Builders", "Health", "Freight", "Systems",
            "Supply", "Realty", "Labs", "Foods", "Fabrication", "Analytics",
        ]
    }
}
