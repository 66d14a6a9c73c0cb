//! Rule-based extraction used when the extraction service is unavailable
//!
//! Works on the latest message only and fills only the slots that are still
//! empty. Recognises numeric and month-name dates, relative day words,
//! cue-anchored city names and transport keywords, in Russian and English.

use chrono::{Datelike, Duration, Local, NaiveDate};
use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::LazyLock;
use tracing::{debug, info};
use voyage_domain::travel_date::{format_parts, format_travel_date};
use voyage_domain::{TransportKind, TravelEntities};

/// One or more capitalised words separated by single spaces
const CITY: &str = r"[A-ZА-ЯЁ][\p{L}-]+(?: [A-ZА-ЯЁ][\p{L}-]+)*";

const ORIGIN_CUES: &[&str] = &[
    "departing from",
    "leaving from",
    "from",
    "отправление из",
    "выезжаю из",
    "старт из",
    "откуда",
    "из",
    "от",
];

const DESTINATION_CUES: &[&str] = &[
    "arriving in",
    "heading to",
    "to",
    "прибытие в",
    "приезжаю в",
    "финиш в",
    "куда",
    "в",
    "до",
];

const WAYPOINT_CUES: &[&str] = &[
    "stopping in",
    "through",
    "via",
    "с остановкой в",
    "с заездом в",
    "заезжая в",
    "проезжая",
    "через",
];

/// Russian stems per kind; a word matches when it starts with the stem
const TRANSPORT_STEMS: &[(TransportKind, &[&str])] = &[
    (TransportKind::Train, &["поезд", "электричк", "вагон"]),
    (
        TransportKind::Plane,
        &["самолет", "самолёт", "авиа", "полет", "полёт", "аэропорт"],
    ),
    (TransportKind::Bus, &["автобус", "автовокзал"]),
];

/// Words matched whole, English forms listed explicitly
const TRANSPORT_WORDS: &[(TransportKind, &[&str])] = &[
    (
        TransportKind::Train,
        &["жд", "ржд", "train", "trains", "rail", "railway", "railways"],
    ),
    (
        TransportKind::Plane,
        &[
            "plane", "planes", "flight", "flights", "fly", "flying", "flies", "airport",
        ],
    ),
    (
        TransportKind::Bus,
        &["bus", "buses", "coach", "coaches"],
    ),
];

/// Relative day words, longest phrase first
const RELATIVE_DAYS: &[(&str, i64)] = &[
    ("day after tomorrow", 2),
    ("послезавтра", 2),
    ("tomorrow", 1),
    ("завтра", 1),
    ("сегодня", 0),
    ("today", 0),
];

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4}|\d{1,2})[./-](\d{1,2})[./-](\d{4}|\d{1,2})\b")
        .expect("numeric date pattern is valid")
});

static MONTH_FIRST_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\p{L}+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s+(\d{4})\b)?")
        .expect("month-first date pattern is valid")
});

static DAY_FIRST_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?(\p{L}+)\b(?:,?\s+(\d{4})\b)?")
        .expect("day-first date pattern is valid")
});

static CITY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b{}", CITY)).expect("city pattern is valid"));

static FROM_TO: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [("from", "to"), ("из", "в")]
        .iter()
        .filter_map(|(from, to)| {
            Regex::new(&format!(
                r"(?i:\b{})\s+({})\s+(?i:{})\s+({})",
                from, CITY, to, CITY
            ))
            .ok()
        })
        .collect()
});

static ORIGIN_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| cue_patterns(ORIGIN_CUES));
static DESTINATION_PATTERNS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| cue_patterns(DESTINATION_CUES));
static WAYPOINT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| cue_patterns(WAYPOINT_CUES));

/// Build `cue + city` patterns; the cue is case-insensitive, the city is not
fn cue_patterns(cues: &[&str]) -> Vec<Regex> {
    cues.iter()
        .filter_map(|cue| {
            let cue = regex::escape(cue).replace(' ', r"\s+");
            Regex::new(&format!(r"(?i:\b{})\s+({})", cue, CITY)).ok()
        })
        .collect()
}

/// Cities found in one message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CityMatches {
    /// Origin, if a cue or pattern named one
    pub start_city: Option<String>,
    /// Destination, if a cue or pattern named one
    pub end_city: Option<String>,
    /// Waypoints in order of appearance
    pub mid_city: Vec<String>,
}

/// Regex and keyword extractor
///
/// Relative dates are resolved against the extractor's clock, which is the
/// local date unless pinned with [`FallbackExtractor::with_today`].
#[derive(Debug, Clone, Default)]
pub struct FallbackExtractor {
    today: Option<NaiveDate>,
}

impl FallbackExtractor {
    /// Create an extractor using the local clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor whose "today" is fixed
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today: Some(today) }
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Fill empty slots of `current` from `message`
    pub fn extract(&self, message: &str, current: &TravelEntities) -> TravelEntities {
        let mut entities = current.clone();

        if entities.date.is_empty() {
            if let Some(date) = self.extract_date(message) {
                entities.date = date;
            }
        }

        let cities = self.extract_cities(message);
        if entities.start_city.is_empty() {
            if let Some(city) = cities.start_city {
                entities.start_city = city;
            }
        }
        if entities.end_city.is_empty() {
            if let Some(city) = cities.end_city {
                entities.end_city = city;
            }
        }
        for city in &cities.mid_city {
            entities.add_waypoint(city);
        }

        for kind in self.extract_transport(message) {
            entities.preferred_transport.set(kind, true);
        }

        info!(
            date = %entities.date,
            start_city = %entities.start_city,
            end_city = %entities.end_city,
            waypoints = entities.mid_city.len(),
            "Entities extracted by fallback rules"
        );
        entities
    }

    /// Find a date and render it as `dd.mm.yyyy`
    ///
    /// A numeric date that fails validation counts as no date at all.
    pub fn extract_date(&self, message: &str) -> Option<String> {
        if let Some(caps) = NUMERIC_DATE.captures(message) {
            let date = numeric_date(&caps);
            if date.is_none() {
                debug!(matched = &caps[0], "Rejected out-of-range date");
            }
            return date;
        }

        if let Some(date) = self.month_name_date(message) {
            return Some(date);
        }

        let lower = message.to_lowercase();
        RELATIVE_DAYS
            .iter()
            .find(|(phrase, _)| lower.contains(phrase))
            .map(|(_, offset)| format_travel_date(self.today() + Duration::days(*offset)))
    }

    fn month_name_date(&self, message: &str) -> Option<String> {
        let month_first = MONTH_FIRST_DATE.captures_iter(message).find_map(|caps| {
            let month = month_number(&caps[1])?;
            Some((caps[2].parse::<u32>().ok()?, month, caps.get(3)))
        });
        let found = month_first.or_else(|| {
            DAY_FIRST_DATE.captures_iter(message).find_map(|caps| {
                let month = month_number(&caps[2])?;
                Some((caps[1].parse::<u32>().ok()?, month, caps.get(3)))
            })
        });

        let (day, month, year) = found?;
        let year = match year {
            Some(year) => year.as_str().parse::<i32>().ok()?,
            None => self.upcoming_year(day, month),
        };
        format_parts(day, month, year)
    }

    /// Year of the next occurrence of `day.month`, counting today
    fn upcoming_year(&self, day: u32, month: u32) -> i32 {
        let today = self.today();
        match NaiveDate::from_ymd_opt(today.year(), month, day) {
            Some(date) if date < today => today.year() + 1,
            _ => today.year(),
        }
    }

    /// Find origin, destination and waypoints
    ///
    /// Waypoint cues are matched first. An origin or destination cue that
    /// starts inside a waypoint phrase ("с остановкой в Тверь") is ignored.
    pub fn extract_cities(&self, message: &str) -> CityMatches {
        let mut mid_city = Vec::new();
        let mut waypoint_spans = Vec::new();
        for pattern in WAYPOINT_PATTERNS.iter() {
            for caps in pattern.captures_iter(message) {
                let Some(whole) = caps.get(0) else { continue };
                waypoint_spans.push(whole.range());
                if let Some(city) = clean_city(&caps[1]) {
                    if !mid_city.contains(&city) {
                        mid_city.push(city);
                    }
                }
            }
        }

        let mut result = CityMatches {
            start_city: first_cue_match(&ORIGIN_PATTERNS, message, &waypoint_spans),
            end_city: first_cue_match(&DESTINATION_PATTERNS, message, &waypoint_spans),
            mid_city,
        };

        if result.start_city.is_none() || result.end_city.is_none() {
            if let Some(caps) = FROM_TO.iter().find_map(|p| p.captures(message)) {
                if result.start_city.is_none() {
                    result.start_city = clean_city(&caps[1]);
                }
                if result.end_city.is_none() {
                    result.end_city = clean_city(&caps[2]);
                }
            }
        }

        if result.start_city.is_none() && result.end_city.is_none() {
            let mut tokens: Vec<String> = Vec::new();
            for m in CITY_TOKEN.find_iter(message) {
                if let Some(city) = clean_city(m.as_str()) {
                    if !tokens.contains(&city) {
                        tokens.push(city);
                    }
                }
            }
            if tokens.len() >= 2 {
                result.start_city = tokens.first().cloned();
                result.end_city = tokens.last().cloned();
                for city in &tokens[1..tokens.len() - 1] {
                    if !result.mid_city.contains(city) {
                        result.mid_city.push(city.clone());
                    }
                }
            }
        }

        result
    }

    /// Transport kinds mentioned in `message`
    pub fn extract_transport(&self, message: &str) -> Vec<TransportKind> {
        let words: Vec<String> = message
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        let mentioned = |kind: TransportKind| {
            let stem_hit = TRANSPORT_STEMS
                .iter()
                .filter(|(k, _)| *k == kind)
                .flat_map(|(_, stems)| stems.iter())
                .any(|stem| words.iter().any(|word| word.starts_with(stem)));
            let word_hit = TRANSPORT_WORDS
                .iter()
                .filter(|(k, _)| *k == kind)
                .flat_map(|(_, keys)| keys.iter())
                .any(|key| words.iter().any(|word| word == key));
            stem_hit || word_hit
        };

        [TransportKind::Train, TransportKind::Plane, TransportKind::Bus]
            .into_iter()
            .filter(|kind| mentioned(*kind))
            .collect()
    }
}

fn numeric_date(caps: &Captures<'_>) -> Option<String> {
    let (first, second, third) = (&caps[1], &caps[2], &caps[3]);
    let (day, month, year) = if first.len() == 4 {
        if third.len() > 2 {
            return None;
        }
        (third, second, first)
    } else {
        if third.len() != 2 && third.len() != 4 {
            return None;
        }
        (first, second, third)
    };
    format_parts(day.parse().ok()?, month.parse().ok()?, year.parse().ok()?)
}

/// Earliest match of any cue pattern outside the `excluded` spans
fn first_cue_match(
    patterns: &[Regex],
    message: &str,
    excluded: &[Range<usize>],
) -> Option<String> {
    patterns
        .iter()
        .filter_map(|pattern| {
            pattern.captures_iter(message).find_map(|caps| {
                let start = caps.get(0)?.start();
                if excluded.iter().any(|span| span.contains(&start)) {
                    return None;
                }
                clean_city(&caps[1]).map(|city| (start, city))
            })
        })
        .min_by_key(|(start, _)| *start)
        .map(|(_, city)| city)
}

/// Cut a capitalised run at the first word that is not part of a name
///
/// "Moscow May" (from "from Moscow May 1") becomes "Moscow"; a run that
/// starts with a month name or cue word is not a city at all.
fn clean_city(run: &str) -> Option<String> {
    let words: Vec<&str> = run
        .split(' ')
        .take_while(|word| !is_stop_word(word))
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn is_stop_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    month_number(&lower).is_some()
        || ORIGIN_CUES
            .iter()
            .chain(DESTINATION_CUES)
            .chain(WAYPOINT_CUES)
            .any(|cue| *cue == lower)
        || matches!(lower.as_str(), "today" | "tomorrow" | "сегодня" | "завтра" | "послезавтра")
}

/// Month number for an English or Russian month name
fn month_number(word: &str) -> Option<u32> {
    let month = match word.to_lowercase().as_str() {
        "january" | "jan" | "января" | "январь" => 1,
        "february" | "feb" | "февраля" | "февраль" => 2,
        "march" | "mar" | "марта" | "март" => 3,
        "april" | "apr" | "апреля" | "апрель" => 4,
        "may" | "мая" | "май" => 5,
        "june" | "jun" | "июня" | "июнь" => 6,
        "july" | "jul" | "июля" | "июль" => 7,
        "august" | "aug" | "августа" | "август" => 8,
        "september" | "sep" | "sept" | "сентября" | "сентябрь" => 9,
        "october" | "oct" | "октября" | "октябрь" => 10,
        "november" | "nov" | "ноября" | "ноябрь" => 11,
        "december" | "dec" | "декабря" | "декабрь" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> FallbackExtractor {
        FallbackExtractor::with_today(NaiveDate::from_ymd_opt(2025, 4, 20).unwrap())
    }

    #[test]
    fn test_numeric_dates() {
        let ex = extractor();
        assert_eq!(ex.extract_date("1-5-25").as_deref(), Some("01.05.2025"));
        assert_eq!(ex.extract_date("on 15.06.2025 please").as_deref(), Some("15.06.2025"));
        assert_eq!(ex.extract_date("3/7/2026").as_deref(), Some("03.07.2026"));
        assert_eq!(ex.extract_date("2025-05-01").as_deref(), Some("01.05.2025"));
    }

    #[test]
    fn test_out_of_range_dates_are_not_found() {
        let ex = extractor();
        assert_eq!(ex.extract_date("32.13.2025"), None);
        assert_eq!(ex.extract_date("01.05.1999"), None);
        assert_eq!(ex.extract_date("1-5-5"), None);
    }

    #[test]
    fn test_month_name_dates() {
        let ex = extractor();
        assert_eq!(ex.extract_date("May 1 2025").as_deref(), Some("01.05.2025"));
        assert_eq!(ex.extract_date("on June 3rd, 2025").as_deref(), Some("03.06.2025"));
        assert_eq!(ex.extract_date("1 May 2025").as_deref(), Some("01.05.2025"));
        assert_eq!(ex.extract_date("1 мая 2025").as_deref(), Some("01.05.2025"));
        assert_eq!(ex.extract_date("12 декабря").as_deref(), Some("12.12.2025"));
    }

    #[test]
    fn test_month_name_without_year_rolls_forward() {
        // 20 April 2025 is "today"; 1 March has passed
        assert_eq!(extractor().extract_date("March 1").as_deref(), Some("01.03.2026"));
    }

    #[test]
    fn test_relative_dates() {
        let ex = extractor();
        assert_eq!(ex.extract_date("today").as_deref(), Some("20.04.2025"));
        assert_eq!(ex.extract_date("leaving tomorrow").as_deref(), Some("21.04.2025"));
        assert_eq!(ex.extract_date("the day after tomorrow").as_deref(), Some("22.04.2025"));
        assert_eq!(ex.extract_date("поеду послезавтра").as_deref(), Some("22.04.2025"));
        assert_eq!(ex.extract_date("завтра").as_deref(), Some("21.04.2025"));
        assert_eq!(ex.extract_date("no date here"), None);
    }

    #[test]
    fn test_cue_cities_english() {
        let cities = extractor().extract_cities("from Moscow to Saint Petersburg via Tver");
        assert_eq!(cities.start_city.as_deref(), Some("Moscow"));
        assert_eq!(cities.end_city.as_deref(), Some("Saint Petersburg"));
        assert_eq!(cities.mid_city, vec!["Tver"]);
    }

    #[test]
    fn test_cue_cities_russian() {
        let cities = extractor().extract_cities("Хочу из Москва в Казань через Владимир");
        assert_eq!(cities.start_city.as_deref(), Some("Москва"));
        assert_eq!(cities.end_city.as_deref(), Some("Казань"));
        assert_eq!(cities.mid_city, vec!["Владимир"]);
    }

    #[test]
    fn test_waypoint_cue_ending_in_preposition() {
        let cities = extractor().extract_cities("из Москва с остановкой в Тверь в Казань");
        assert_eq!(cities.start_city.as_deref(), Some("Москва"));
        assert_eq!(cities.end_city.as_deref(), Some("Казань"));
        assert_eq!(cities.mid_city, vec!["Тверь"]);

        let cities = extractor().extract_cities("из Самара с заездом в Уфа в Пермь");
        assert_eq!(cities.end_city.as_deref(), Some("Пермь"));
        assert_eq!(cities.mid_city, vec!["Уфа"]);
    }

    #[test]
    fn test_waypoint_cue_keeps_route_intact() {
        let entities = extractor().extract(
            "из Москва заезжая в Тверь в Казань",
            &TravelEntities::new(),
        );
        assert_eq!(
            entities.waypoints(),
            vec!["Москва".to_string(), "Тверь".to_string(), "Казань".to_string()]
        );
    }

    #[test]
    fn test_city_requires_capital_letter() {
        let cities = extractor().extract_cities("i want to go from home");
        assert_eq!(cities, CityMatches::default());
    }

    #[test]
    fn test_single_cue() {
        let cities = extractor().extract_cities("from Moscow");
        assert_eq!(cities.start_city.as_deref(), Some("Moscow"));
        assert_eq!(cities.end_city, None);

        let cities = extractor().extract_cities("to Saint Petersburg");
        assert_eq!(cities.start_city, None);
        assert_eq!(cities.end_city.as_deref(), Some("Saint Petersburg"));
    }

    #[test]
    fn test_city_run_stops_at_month() {
        let cities = extractor().extract_cities("from Moscow May 1");
        assert_eq!(cities.start_city.as_deref(), Some("Moscow"));
    }

    #[test]
    fn test_capitalised_tokens_fallback() {
        let cities = extractor().extract_cities("Kazan, Samara, Ufa");
        assert_eq!(cities.start_city.as_deref(), Some("Kazan"));
        assert_eq!(cities.end_city.as_deref(), Some("Ufa"));
        assert_eq!(cities.mid_city, vec!["Samara"]);

        // A lone capitalised word and a month are not a route
        let cities = extractor().extract_cities("May 1 2025");
        assert_eq!(cities, CityMatches::default());
    }

    #[test]
    fn test_transport_keywords() {
        let ex = extractor();
        assert_eq!(ex.extract_transport("by train please"), vec![TransportKind::Train]);
        assert_eq!(
            ex.extract_transport("поездом или автобусом"),
            vec![TransportKind::Train, TransportKind::Bus]
        );
        assert_eq!(ex.extract_transport("I'd rather fly"), vec![TransportKind::Plane]);
        assert!(ex.extract_transport("business trip").is_empty());
    }

    #[test]
    fn test_english_words_match_whole() {
        let ex = extractor();
        assert!(ex.extract_transport("after training I watch a planet show").is_empty());
        assert!(ex.extract_transport("a coaching session").is_empty());
        assert_eq!(
            ex.extract_transport("flights or trains"),
            vec![TransportKind::Train, TransportKind::Plane]
        );
        assert_eq!(ex.extract_transport("на электричке"), vec![TransportKind::Train]);
        assert_eq!(ex.extract_transport("самолётом"), vec![TransportKind::Plane]);
    }

    #[test]
    fn test_extract_fills_only_empty_slots() {
        let mut current = TravelEntities::new();
        current.start_city = "Kazan".to_string();
        current.date = "02.05.2025".to_string();

        let entities = extractor().extract("from Moscow to Tver on 01.05.2025 by bus", &current);
        assert_eq!(entities.start_city, "Kazan");
        assert_eq!(entities.date, "02.05.2025");
        assert_eq!(entities.end_city, "Tver");
        assert!(entities.preferred_transport.is_selected(TransportKind::Bus));
    }

    #[test]
    fn test_extract_never_negates_transport() {
        let mut current = TravelEntities::new();
        current.preferred_transport.set(TransportKind::Plane, true);
        let entities = extractor().extract("by train", &current);
        assert!(entities.preferred_transport.is_selected(TransportKind::Plane));
        assert!(entities.preferred_transport.is_selected(TransportKind::Train));
    }
}
