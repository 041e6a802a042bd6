//! Reference geography for generated snapshots.
//!
//! The 28 states with their regions and the real cities of each,
//! tiered by size. Ids are assigned in list order starting at 1.

use crate::domain::{Region, Tier};

use crate::domain::Tier::{Tier1 as T1, Tier2 as T2, Tier3 as T3};

pub struct StateRef {
    pub name: &'static str,
    pub region: Region,
    pub cities: &'static [(&'static str, Tier)],
}

pub static STATES: &[StateRef] = &[
    StateRef {
        name: "Andhra Pradesh",
        region: Region::South,
        cities: &[
            ("Visakhapatnam", T2), ("Vijayawada", T2), ("Guntur", T3), ("Tirupati", T2),
            ("Kurnool", T3), ("Nellore", T3), ("Rajahmundry", T3), ("Anantapur", T3),
            ("Kadapa", T3), ("Chittoor", T3), ("Eluru", T3), ("Srikakulam", T3), ("Ongole", T3),
            ("Proddatur", T3), ("Nandyal", T3), ("Kakinada", T3), ("Bapatla", T3),
            ("Tenali", T3), ("Bhimavaram", T3), ("Amalapuram", T3),
        ],
    },
    StateRef {
        name: "Arunachal Pradesh",
        region: Region::Northeast,
        cities: &[
            ("Itanagar", T3), ("Tawang", T3), ("Ziro", T3), ("Pasighat", T3),
            ("Naharlagun", T3), ("Roing", T3), ("Tezu", T3), ("Namsai", T3), ("Aalo", T3),
            ("Bomdila", T3), ("Seppa", T3), ("Yingkiong", T3), ("Changlang", T3),
        ],
    },
    StateRef {
        name: "Assam",
        region: Region::Northeast,
        cities: &[
            ("Guwahati", T2), ("Dibrugarh", T3), ("Jorhat", T3), ("Nagaon", T3),
            ("Silchar", T3), ("Tinsukia", T3), ("Bongaigaon", T3), ("Barpeta", T3),
            ("Tezpur", T3), ("Sivasagar", T3), ("Nalbari", T3), ("Dhemaji", T3),
            ("Goalpara", T3),
        ],
    },
    StateRef {
        name: "Bihar",
        region: Region::East,
        cities: &[
            ("Patna", T2), ("Gaya", T3), ("Bhagalpur", T3), ("Muzaffarpur", T3),
            ("Darbhanga", T3), ("Munger", T3), ("Begusarai", T3), ("Purnia", T3), ("Arrah", T3),
            ("Siwan", T3), ("Samastipur", T3), ("Nalanda", T3), ("Buxar", T3),
        ],
    },
    StateRef {
        name: "Chhattisgarh",
        region: Region::Central,
        cities: &[
            ("Raipur", T2), ("Bhilai", T3), ("Bilaspur", T3), ("Korba", T3), ("Durg", T3),
            ("Rajnandgaon", T3), ("Raigarh", T3), ("Jagdalpur", T3), ("Ambikapur", T3),
            ("Dhamtari", T3),
        ],
    },
    StateRef {
        name: "Goa",
        region: Region::West,
        cities: &[
            ("Panaji", T3), ("Vasco da Gama", T3), ("Margao", T3), ("Mapusa", T3),
            ("Ponda", T3), ("Bicholim", T3),
        ],
    },
    StateRef {
        name: "Gujarat",
        region: Region::West,
        cities: &[
            ("Ahmedabad", T1), ("Surat", T1), ("Vadodara", T2), ("Rajkot", T2),
            ("Gandhinagar", T3), ("Bhavnagar", T3), ("Jamnagar", T3), ("Junagadh", T3),
            ("Anand", T3), ("Nadiad", T3), ("Valsad", T3), ("Bharuch", T3), ("Porbandar", T3),
            ("Patan", T3),
        ],
    },
    StateRef {
        name: "Haryana",
        region: Region::North,
        cities: &[
            ("Faridabad", T1), ("Gurgaon", T1), ("Ambala", T3), ("Hisar", T3), ("Panipat", T3),
            ("Rohtak", T3), ("Karnal", T3), ("Sonipat", T3), ("Yamunanagar", T3), ("Sirsa", T3),
        ],
    },
    StateRef {
        name: "Himachal Pradesh",
        region: Region::North,
        cities: &[
            ("Shimla", T3), ("Dharamshala", T3), ("Manali", T3), ("Solan", T3), ("Kullu", T3),
            ("Mandi", T3), ("Nahan", T3), ("Palampur", T3), ("Bilaspur", T3), ("Hamirpur", T3),
        ],
    },
    StateRef {
        name: "Jharkhand",
        region: Region::East,
        cities: &[
            ("Ranchi", T2), ("Jamshedpur", T2), ("Dhanbad", T3), ("Bokaro Steel City", T3),
            ("Hazaribagh", T3), ("Deoghar", T3), ("Dumka", T3), ("Giridih", T3),
            ("Chaibasa", T3),
        ],
    },
    StateRef {
        name: "Karnataka",
        region: Region::South,
        cities: &[
            ("Bengaluru", T1), ("Mysuru", T2), ("Mangaluru", T2), ("Hubballi", T3),
            ("Belagavi", T3), ("Davangere", T3), ("Ballari", T3), ("Tumakuru", T3),
            ("Udupi", T3), ("Chikkamagaluru", T3),
        ],
    },
    StateRef {
        name: "Kerala",
        region: Region::South,
        cities: &[
            ("Thiruvananthapuram", T2), ("Kochi", T1), ("Kozhikode", T2), ("Thrissur", T3),
            ("Kollam", T3), ("Kannur", T3), ("Alappuzha", T3), ("Palakkad", T3),
            ("Kottayam", T3), ("Malappuram", T3),
        ],
    },
    StateRef {
        name: "Madhya Pradesh",
        region: Region::Central,
        cities: &[
            ("Bhopal", T2), ("Indore", T1), ("Gwalior", T2), ("Jabalpur", T2), ("Ujjain", T3),
            ("Sagar", T3), ("Rewa", T3), ("Satna", T3), ("Khandwa", T3), ("Burhanpur", T3),
        ],
    },
    StateRef {
        name: "Maharashtra",
        region: Region::West,
        cities: &[
            ("Mumbai", T1), ("Pune", T1), ("Nagpur", T1), ("Nashik", T2), ("Aurangabad", T2),
            ("Thane", T1), ("Solapur", T2), ("Kolhapur", T3), ("Amravati", T3), ("Jalgaon", T3),
            ("Nanded", T3), ("Sangli", T3), ("Akola", T3), ("Chandrapur", T3), ("Parbhani", T3),
        ],
    },
    StateRef {
        name: "Manipur",
        region: Region::Northeast,
        cities: &[
            ("Imphal", T3), ("Thoubal", T3), ("Kakching", T3), ("Bishnupur", T3),
            ("Churachandpur", T3),
        ],
    },
    StateRef {
        name: "Meghalaya",
        region: Region::Northeast,
        cities: &[
            ("Shillong", T3), ("Tura", T3), ("Jowai", T3), ("Nongpoh", T3),
            ("Williamnagar", T3),
        ],
    },
    StateRef {
        name: "Mizoram",
        region: Region::Northeast,
        cities: &[
            ("Aizawl", T3), ("Lunglei", T3), ("Champhai", T3), ("Kolasib", T3),
            ("Serchhip", T3),
        ],
    },
    StateRef {
        name: "Nagaland",
        region: Region::Northeast,
        cities: &[
            ("Kohima", T3), ("Dimapur", T3), ("Mokokchung", T3), ("Wokha", T3),
            ("Zunheboto", T3),
        ],
    },
    StateRef {
        name: "Odisha",
        region: Region::East,
        cities: &[
            ("Bhubaneswar", T2), ("Cuttack", T2), ("Rourkela", T3), ("Berhampur", T3),
            ("Sambalpur", T3), ("Balasore", T3), ("Jharsuguda", T3),
        ],
    },
    StateRef {
        name: "Punjab",
        region: Region::North,
        cities: &[
            ("Amritsar", T2), ("Ludhiana", T2), ("Jalandhar", T2), ("Patiala", T3),
            ("Bathinda", T3), ("Mohali", T2), ("Hoshiarpur", T3), ("Moga", T3),
        ],
    },
    StateRef {
        name: "Rajasthan",
        region: Region::North,
        cities: &[
            ("Jaipur", T1), ("Jodhpur", T2), ("Udaipur", T2), ("Kota", T2), ("Ajmer", T3),
            ("Bikaner", T3), ("Alwar", T3), ("Chittorgarh", T3), ("Pali", T3), ("Sikar", T3),
        ],
    },
    StateRef {
        name: "Sikkim",
        region: Region::Northeast,
        cities: &[
            ("Gangtok", T3), ("Namchi", T3), ("Mangan", T3),
        ],
    },
    StateRef {
        name: "Tamil Nadu",
        region: Region::South,
        cities: &[
            ("Chennai", T1), ("Coimbatore", T1), ("Madurai", T2), ("Tiruchirappalli", T2),
            ("Salem", T2), ("Tirunelveli", T3), ("Erode", T3), ("Vellore", T3),
            ("Dindigul", T3),
        ],
    },
    StateRef {
        name: "Telangana",
        region: Region::South,
        cities: &[
            ("Hyderabad", T1), ("Warangal", T2), ("Khammam", T3), ("Karimnagar", T3),
            ("Nizamabad", T3), ("Mahabubnagar", T3),
        ],
    },
    StateRef {
        name: "Tripura",
        region: Region::Northeast,
        cities: &[
            ("Agartala", T3), ("Kailashahar", T3), ("Udaipur", T3), ("Belonia", T3),
        ],
    },
    StateRef {
        name: "Uttar Pradesh",
        region: Region::North,
        cities: &[
            ("Lucknow", T1), ("Kanpur", T1), ("Varanasi", T2), ("Agra", T2), ("Allahabad", T2),
            ("Ghaziabad", T1), ("Meerut", T2), ("Noida", T1), ("Bareilly", T3), ("Aligarh", T3),
        ],
    },
    StateRef {
        name: "Uttarakhand",
        region: Region::North,
        cities: &[
            ("Dehradun", T2), ("Haridwar", T3), ("Nainital", T3), ("Roorkee", T3),
            ("Haldwani", T3),
        ],
    },
    StateRef {
        name: "West Bengal",
        region: Region::East,
        cities: &[
            ("Kolkata", T1), ("Darjeeling", T3), ("Siliguri", T2), ("Asansol", T3),
            ("Howrah", T2), ("Durgapur", T3), ("Kalyani", T3),
        ],
    },
];

/// Total number of reference cities.
pub fn city_count() -> usize {
    STATES.iter().map(|s| s.cities.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn twenty_eight_states_every_one_with_cities() {
        assert_eq!(STATES.len(), 28);
        for s in STATES {
            assert!(!s.cities.is_empty(), "{} has no cities", s.name);
            assert!(!matches!(s.region, Region::Other(_)), "{} has no region", s.name);
        }
    }

    #[test]
    fn state_names_are_unique() {
        let names: HashSet<_> = STATES.iter().map(|s| s.name).collect();
        assert_eq!(names.len(), STATES.len());
    }

    #[test]
    fn every_tier_is_represented() {
        let tiers: HashSet<String> = STATES
            .iter()
            .flat_map(|s| s.cities.iter().map(|(_, t)| t.label().to_string()))
            .collect();
        assert_eq!(tiers.len(), 3);
        assert!(city_count() > 200);
    }
}
