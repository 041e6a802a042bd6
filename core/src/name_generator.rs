//! Deterministic customer identity generation using curated name lists.
//!
//! Provides Indian personal names, contact emails and street addresses.
//! All generation is deterministic (same RNG seed = same identities).

use crate::rng::StreamRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

/// Deterministic name generator using curated name lists
pub struct NameGenerator;

impl NameGenerator {
    pub fn generate_gender(rng: &mut StreamRng) -> Gender {
        if rng.chance(0.5) {
            Gender::Male
        } else {
            Gender::Female
        }
    }

    pub fn generate_first_name(rng: &mut StreamRng, gender: Gender) -> &'static str {
        let names = match gender {
            Gender::Male => MALE_FIRST_NAMES,
            Gender::Female => FEMALE_FIRST_NAMES,
        };
        names[rng.index(names.len())]
    }

    pub fn generate_last_name(rng: &mut StreamRng) -> &'static str {
        LAST_NAMES[rng.index(LAST_NAMES.len())]
    }

    /// Lower-case "first.last{customer_id}@domain".
    pub fn email_for(first: &str, last: &str, customer_id: i64, rng: &mut StreamRng) -> String {
        let domain = EMAIL_DOMAINS[rng.index(EMAIL_DOMAINS.len())];
        format!(
            "{}.{}{}@{}",
            first.to_lowercase(),
            last.to_lowercase(),
            customer_id,
            domain
        )
    }

    /// House number, street and locality in the given city.
    pub fn generate_address(rng: &mut StreamRng, city: &str, state: &str) -> String {
        let house = rng.range_i64(1, 999);
        let street = STREETS[rng.index(STREETS.len())];
        let locality = LOCALITIES[rng.index(LOCALITIES.len())];
        let pin = rng.range_i64(110_001, 855_999);
        format!("{house}, {street}, {locality}, {city}, {state} {pin}")
    }
}

const MALE_FIRST_NAMES: &[&str] = &[
    "Aarav", "Aditya", "Akash", "Amit", "Anand", "Anil", "Arjun", "Arun", "Ashok", "Deepak",
    "Dev", "Dhruv", "Gaurav", "Harish", "Ishaan", "Jatin", "Karan", "Kartik", "Kunal", "Lokesh",
    "Manish", "Mohit", "Naveen", "Nikhil", "Nitin", "Pankaj", "Pranav", "Prateek", "Rahul", "Rajesh",
    "Rakesh", "Ravi", "Rohan", "Rohit", "Sachin", "Sandeep", "Sanjay", "Saurabh", "Shivam", "Siddharth",
    "Sumit", "Suresh", "Tarun", "Varun", "Vijay", "Vikas", "Vikram", "Vinay", "Vivek", "Yash",
];

const FEMALE_FIRST_NAMES: &[&str] = &[
    "Aishwarya", "Ananya", "Anjali", "Ankita", "Aarti", "Bhavna", "Deepika", "Divya", "Gayatri", "Isha",
    "Jyoti", "Kavya", "Kiran", "Lakshmi", "Madhuri", "Meera", "Megha", "Neha", "Nisha", "Pallavi",
    "Pooja", "Priya", "Radha", "Rashmi", "Riya", "Sakshi", "Shalini", "Shreya", "Simran", "Sneha",
    "Sonal", "Sunita", "Swati", "Tanvi", "Uma", "Vandana", "Vidya", "Yamini", "Zoya", "Nandini",
];

const LAST_NAMES: &[&str] = &[
    "Agarwal", "Bansal", "Bhat", "Chatterjee", "Chauhan", "Das", "Desai", "Dubey", "Gupta", "Iyer",
    "Jain", "Joshi", "Kapoor", "Khan", "Kulkarni", "Kumar", "Malhotra", "Mehta", "Menon", "Mishra",
    "Nair", "Naidu", "Pandey", "Patel", "Pillai", "Rao", "Reddy", "Saxena", "Sharma", "Shetty",
    "Singh", "Sinha", "Srivastava", "Thakur", "Trivedi", "Verma", "Yadav", "Ghosh", "Banerjee", "Bose",
];

const EMAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.co.in", "outlook.com", "rediffmail.com"];

const STREETS: &[&str] = &[
    "MG Road", "Station Road", "Gandhi Nagar", "Nehru Street", "Park Street", "Main Bazaar",
    "Temple Road", "Lake View Road", "Ring Road", "Civil Lines",
];

const LOCALITIES: &[&str] = &[
    "Sector 4", "Old Town", "New Colony", "Shastri Nagar", "Rajendra Nagar", "Model Town",
    "Indira Nagar", "Vasant Vihar", "Ashok Nagar", "Green Park",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StreamSlot};

    #[test]
    fn name_generation_is_deterministic() {
        let mut rng1 = RngBank::new(12345).for_stream(StreamSlot::Customer);
        let mut rng2 = RngBank::new(12345).for_stream(StreamSlot::Customer);

        let a = (
            NameGenerator::generate_first_name(&mut rng1, Gender::Female),
            NameGenerator::generate_last_name(&mut rng1),
        );
        let b = (
            NameGenerator::generate_first_name(&mut rng2, Gender::Female),
            NameGenerator::generate_last_name(&mut rng2),
        );
        assert_eq!(a, b, "Same seed should produce same name");
    }

    #[test]
    fn first_names_follow_gender() {
        let mut rng = RngBank::new(9).for_stream(StreamSlot::Customer);
        for _ in 0..50 {
            let male = NameGenerator::generate_first_name(&mut rng, Gender::Male);
            assert!(MALE_FIRST_NAMES.contains(&male), "{male} is not a male name");
            let female = NameGenerator::generate_first_name(&mut rng, Gender::Female);
            assert!(FEMALE_FIRST_NAMES.contains(&female), "{female} is not a female name");
        }
    }

    #[test]
    fn email_embeds_customer_id() {
        let mut rng = RngBank::new(1).for_stream(StreamSlot::Customer);
        let email = NameGenerator::email_for("Priya", "Sharma", 77, &mut rng);
        assert!(email.starts_with("priya.sharma77@"), "unexpected email {email}");
    }

    #[test]
    fn address_names_city_and_state() {
        let mut rng = RngBank::new(1).for_stream(StreamSlot::Customer);
        let address = NameGenerator::generate_address(&mut rng, "Pune", "Maharashtra");
        assert!(address.contains("Pune, Maharashtra"), "unexpected address {address}");
    }
}
