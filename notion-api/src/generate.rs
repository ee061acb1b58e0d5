//! Synthetic records
//!
//! Generates plausible random property values for every column of a
//! database schema, for seeding test databases.
//!
//! | type          | value                                          |
//! |---------------|------------------------------------------------|
//! | date          | a time within the past year                    |
//! | select        | one declared option                            |
//! | multi_select  | a single declared option                       |
//! | email         | `first.last@domain`                            |
//! | checkbox      | true or false                                  |
//! | url           | `https://word-word.tld`                        |
//! | number        | integer in `0..=99_999`                        |
//! | title         | three lorem words                              |
//! | rich_text     | a first name                                   |
//! | phone_number  | `(###) ###-####`                               |
//!
//! Select and multi-select columns without options, and columns of any other
//! type, are left out of the record.

use std::collections::BTreeMap;

use chrono::{Duration, SecondsFormat, Utc};
use rand::{Rng, seq::IndexedRandom};
use tracing::warn;

use crate::{
    schema::{PropertyType, Schema},
    values::{DateInput, PropertyValueInput},
};

/// Property values of one page: property name -> value
pub type Record = BTreeMap<String, PropertyValueInput>;

const LOREM: &[&str] = &[
    "lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "sed",
    "do",
    "eiusmod",
    "tempor",
    "incididunt",
    "ut",
    "labore",
    "et",
    "dolore",
    "magna",
    "aliqua",
    "enim",
    "ad",
    "minim",
    "veniam",
    "quis",
    "nostrud",
    "exercitation",
    "ullamco",
    "laboris",
    "nisi",
    "aliquip",
    "ex",
    "ea",
    "commodo",
    "consequat",
    "duis",
    "aute",
    "irure",
    "in",
    "reprehenderit",
    "voluptate",
    "velit",
    "esse",
    "cillum",
    "fugiat",
    "nulla",
    "pariatur",
];

const FIRST_NAMES: &[&str] = &[
    "Ada",
    "Alan",
    "Barbara",
    "Claude",
    "Donald",
    "Edsger",
    "Frances",
    "Grace",
    "Hedy",
    "Ivan",
    "John",
    "Katherine",
    "Linus",
    "Margaret",
    "Niklaus",
    "Ole",
    "Radia",
    "Shafi",
    "Tim",
    "Whitfield",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace",
    "Turing",
    "Liskov",
    "Shannon",
    "Knuth",
    "Dijkstra",
    "Allen",
    "Hopper",
    "Lamarr",
    "Sutherland",
    "Backus",
    "Johnson",
    "Torvalds",
    "Hamilton",
    "Wirth",
    "Dahl",
    "Perlman",
    "Goldwasser",
    "Berners-Lee",
    "Diffie",
];

const DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

const TLDS: &[&str] = &["com", "org", "net", "io", "info"];

/// Picks a random word from the lorem vocabulary
pub fn random_word<R: Rng>(rng: &mut R) -> &'static str {
    LOREM.choose(rng).copied().unwrap_or("lorem")
}

fn random_words<R: Rng>(rng: &mut R, count: usize) -> String {
    (0..count)
        .map(|_| random_word(rng))
        .collect::<Vec<_>>()
        .join(" ")
}

fn pick<R: Rng>(rng: &mut R, list: &[&'static str]) -> &'static str {
    list.choose(rng).copied().unwrap_or_default()
}

fn random_email<R: Rng>(rng: &mut R) -> String {
    format!(
        "{}.{}{}@{}",
        pick(rng, FIRST_NAMES).to_lowercase(),
        pick(rng, LAST_NAMES).to_lowercase(),
        rng.random_range(1..100),
        pick(rng, DOMAINS)
    )
}

fn random_url<R: Rng>(rng: &mut R) -> String {
    format!(
        "https://{}-{}.{}",
        random_word(rng),
        random_word(rng),
        pick(rng, TLDS)
    )
}

fn random_phone<R: Rng>(rng: &mut R) -> String {
    format!(
        "({:03}) {:03}-{:04}",
        rng.random_range(200..1000),
        rng.random_range(0..1000),
        rng.random_range(0..10_000)
    )
}

fn random_past_date<R: Rng>(rng: &mut R) -> String {
    let seconds_ago = rng.random_range(1..=365 * 24 * 60 * 60);
    (Utc::now() - Duration::seconds(seconds_ago)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Generates a record for the schema using the thread-local random generator.
pub fn generate_record(schema: &Schema) -> Record {
    generate_record_with(schema, &mut rand::rng())
}

/// Generates a record for the schema using the provided random generator.
pub fn generate_record_with<R: Rng>(schema: &Schema, rng: &mut R) -> Record {
    let mut record = Record::new();
    for (name, property) in schema {
        let value = match &property.kind {
            PropertyType::Date => Some(PropertyValueInput::Date {
                date: DateInput {
                    start: random_past_date(rng),
                    end: None,
                },
            }),
            PropertyType::MultiSelect => property.options().choose(rng).map(|option| {
                PropertyValueInput::MultiSelect {
                    multi_select: vec![option.clone()],
                }
            }),
            PropertyType::Select => {
                property
                    .options()
                    .choose(rng)
                    .map(|option| PropertyValueInput::Select {
                        select: option.clone(),
                    })
            }
            PropertyType::Email => Some(PropertyValueInput::Email {
                email: random_email(rng),
            }),
            PropertyType::Checkbox => Some(PropertyValueInput::Checkbox {
                checkbox: rng.random_bool(0.5),
            }),
            PropertyType::Url => Some(PropertyValueInput::Url {
                url: random_url(rng),
            }),
            PropertyType::Number => Some(PropertyValueInput::Number {
                number: rng.random_range(0..=99_999u32).into(),
            }),
            PropertyType::Title => Some(PropertyValueInput::title(random_words(rng, 3))),
            PropertyType::RichText => Some(PropertyValueInput::rich_text(pick(rng, FIRST_NAMES))),
            PropertyType::PhoneNumber => Some(PropertyValueInput::PhoneNumber {
                phone_number: random_phone(rng),
            }),
            other => {
                warn!(property = %name, kind = %other, "unimplemented property type, skipped");
                None
            }
        };
        if let Some(value) = value {
            record.insert(name.clone(), value);
        }
    }
    record
}

/// Picks a random select column that has options, and one of its option names.
/// Returns (column name, option name), or None if the schema has no such column.
pub fn random_select_value<R: Rng>(schema: &Schema, rng: &mut R) -> Option<(String, String)> {
    let candidates = schema
        .iter()
        .filter(|(_, prop)| prop.kind == PropertyType::Select && !prop.options().is_empty())
        .collect::<Vec<_>>();
    let (name, prop) = candidates.choose(rng)?;
    let option = prop.options().choose(rng)?;
    Some((name.to_string(), option.name.clone()))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use rand::{SeedableRng, rngs::StdRng};
    use serde_json::json;

    use super::*;
    use crate::{
        rich_text::RichTextInput,
        schema::{DatabaseProperty, SelectOption},
    };

    fn prop(name: &str, kind: PropertyType) -> (String, DatabaseProperty) {
        (name.to_string(), DatabaseProperty::new(name, kind))
    }

    fn with_options(
        name: &str,
        kind: PropertyType,
        options: &[&str],
    ) -> (String, DatabaseProperty) {
        (
            name.to_string(),
            DatabaseProperty::new(name, kind)
                .with_options(options.iter().map(|o| SelectOption::named(*o)).collect()),
        )
    }

    fn full_schema() -> Schema {
        Schema::from([
            prop("Name", PropertyType::Title),
            prop("launch date", PropertyType::Date),
            with_options("tags", PropertyType::MultiSelect, &["tag1", "tag2"]),
            with_options("category", PropertyType::Select, &["cat1", "cat2"]),
            prop("email", PropertyType::Email),
            prop("checked", PropertyType::Checkbox),
            prop("twitter", PropertyType::Url),
            prop("amount", PropertyType::Number),
            prop("description", PropertyType::RichText),
            prop("contact_nr", PropertyType::PhoneNumber),
        ])
    }

    #[test]
    fn test_select_end_to_end() {
        let schema = Schema::from([with_options("cat", PropertyType::Select, &["A", "B"])]);
        for seed in 0..20 {
            let record = generate_record_with(&schema, &mut StdRng::seed_from_u64(seed));
            let value = serde_json::to_value(&record).unwrap();
            let name = value["cat"]["select"]["name"].as_str().unwrap().to_string();
            assert!(name == "A" || name == "B", "{name}");
            assert_eq!(value["cat"], json!({"type": "select", "select": {"name": name}}));
        }
    }

    #[test]
    fn test_every_supported_type_generated() {
        let schema = full_schema();
        let mut rng = StdRng::seed_from_u64(7);
        let record = generate_record_with(&schema, &mut rng);
        assert_eq!(record.len(), schema.len());
        for (name, value) in &record {
            assert_eq!(value.type_name(), schema[name].kind.as_str());
        }
    }

    #[test]
    fn test_value_shapes() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let record = generate_record_with(&full_schema(), &mut rng);

            let PropertyValueInput::Title { title } = &record["Name"] else {
                panic!("title");
            };
            assert_eq!(title.len(), 1);
            assert_eq!(RichTextInput::content(&title[0]).split(' ').count(), 3);

            let PropertyValueInput::MultiSelect { multi_select } = &record["tags"] else {
                panic!("multi_select");
            };
            assert_eq!(multi_select.len(), 1);
            assert!(["tag1", "tag2"].contains(&multi_select[0].name.as_str()));

            let PropertyValueInput::Number { number } = &record["amount"] else {
                panic!("number");
            };
            assert!(number.as_u64().is_some_and(|n| n <= 99_999));

            let PropertyValueInput::Email { email } = &record["email"] else {
                panic!("email");
            };
            let (local, domain) = email.split_once('@').unwrap();
            assert!(!local.is_empty() && domain.contains('.'));

            let PropertyValueInput::Url { url } = &record["twitter"] else {
                panic!("url");
            };
            assert!(url.starts_with("https://"));

            let PropertyValueInput::PhoneNumber { phone_number } = &record["contact_nr"] else {
                panic!("phone");
            };
            assert_eq!(phone_number.len(), "(###) ###-####".len());
            assert!(phone_number.starts_with('(') && phone_number.chars().nth(9) == Some('-'));

            let PropertyValueInput::Date { date } = &record["launch date"] else {
                panic!("date");
            };
            assert!(date.start.ends_with('Z'));
            let start = DateTime::parse_from_rfc3339(&date.start).unwrap();
            let age = Utc::now().signed_duration_since(start);
            assert!(age > Duration::zero() && age <= Duration::days(366));
        }
    }

    #[test]
    fn test_empty_options_omitted() {
        let schema = Schema::from([
            with_options("cat", PropertyType::Select, &[]),
            with_options("tags", PropertyType::MultiSelect, &[]),
            prop("bare select", PropertyType::Select),
        ]);
        let record = generate_record_with(&schema, &mut StdRng::seed_from_u64(1));
        assert!(record.is_empty());
    }

    #[test_log::test]
    fn test_unsupported_types_skipped() {
        let schema = Schema::from([
            prop("Name", PropertyType::Title),
            prop("people", PropertyType::People),
            prop("formula", PropertyType::Formula),
            prop("future", PropertyType::Unknown("hologram".into())),
        ]);
        let record = generate_record_with(&schema, &mut StdRng::seed_from_u64(3));
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["Name"]);
    }

    #[test]
    fn test_same_seed_same_record_without_dates() {
        let mut schema = full_schema();
        schema.remove("launch date");
        let a = generate_record_with(&schema, &mut StdRng::seed_from_u64(99));
        let b = generate_record_with(&schema, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_select_value() {
        let mut rng = StdRng::seed_from_u64(5);
        let (column, value) = random_select_value(&full_schema(), &mut rng).unwrap();
        assert_eq!(column, "category");
        assert!(value == "cat1" || value == "cat2");

        let schema = Schema::from([
            prop("Name", PropertyType::Title),
            with_options("cat", PropertyType::Select, &[]),
        ]);
        assert_eq!(random_select_value(&schema, &mut rng), None);
    }

    #[test]
    fn test_random_word_from_vocabulary() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            assert!(LOREM.contains(&random_word(&mut rng)));
        }
    }
}
