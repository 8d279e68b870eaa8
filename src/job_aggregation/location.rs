// src/job_aggregation/location.rs
//! Heuristic US/non-US classification of free-text job locations.
//!
//! Missing an American job costs more than showing an ambiguous one, so
//! anything that is not clearly outside the US is accepted.

use once_cell::sync::Lazy;
use regex::Regex;

const NON_US_COUNTRIES: &[&str] = &[
    "canada", "mexico", "brazil", "brasil", "argentina", "chile", "colombia", "peru",
    "uruguay", "costa rica", "united kingdom", "uk", "england", "scotland", "wales",
    "northern ireland", "ireland", "france", "germany", "deutschland", "spain", "portugal",
    "italy", "netherlands", "the netherlands", "belgium", "switzerland", "austria", "sweden",
    "norway", "denmark", "finland", "iceland", "poland", "czech republic", "czechia",
    "slovakia", "romania", "hungary", "greece", "turkey", "türkiye", "israel", "uae",
    "united arab emirates", "saudi arabia", "qatar", "egypt", "nigeria", "kenya", "ghana",
    "south africa", "india", "pakistan", "bangladesh", "sri lanka", "china", "hong kong",
    "taiwan", "japan", "korea", "south korea", "singapore", "malaysia", "indonesia",
    "philippines", "vietnam", "thailand", "australia", "new zealand", "ukraine", "estonia",
    "lithuania", "latvia", "serbia", "croatia", "slovenia", "bulgaria", "luxembourg",
    "cyprus", "malta",
];

const NON_US_CITIES: &[&str] = &[
    "london", "paris", "berlin", "munich", "münchen", "hamburg", "frankfurt", "cologne",
    "amsterdam", "rotterdam", "dublin", "madrid", "barcelona", "lisbon", "porto", "milan",
    "rome", "zurich", "zürich", "geneva", "stockholm", "copenhagen", "oslo", "helsinki",
    "warsaw", "krakow", "kraków", "wroclaw", "prague", "vienna", "budapest", "bucharest",
    "athens", "istanbul", "tel aviv", "dubai", "abu dhabi", "riyadh", "cairo", "lagos",
    "nairobi", "cape town", "johannesburg", "bangalore", "bengaluru", "mumbai", "delhi",
    "new delhi", "hyderabad", "pune", "chennai", "gurgaon", "gurugram", "noida", "kolkata",
    "beijing", "shanghai", "shenzhen", "guangzhou", "tokyo", "osaka", "seoul", "manila",
    "jakarta", "kuala lumpur", "bangkok", "ho chi minh", "hanoi", "sydney", "melbourne",
    "brisbane", "perth", "auckland", "toronto", "vancouver", "montreal", "montréal",
    "ottawa", "calgary", "edmonton", "waterloo, on", "mexico city", "ciudad de méxico",
    "guadalajara", "monterrey", "sao paulo", "são paulo", "rio de janeiro", "buenos aires",
    "santiago", "bogota", "bogotá", "medellin", "medellín", "lima", "montevideo", "kyiv",
    "kiev", "tallinn", "vilnius", "riga", "belgrade", "edinburgh", "glasgow", "belfast",
];

const NON_US_REGIONS: &[&str] = &[
    "emea", "apac", "latam", "eu", "europe", "european union", "asia", "asia pacific",
    "middle east", "africa", "oceania", "anz", "dach", "nordics", "benelux",
];

const US_TOKENS: &[&str] = &[
    "united states", "united states of america", "usa", "u.s.", "u.s.a.", "us", "america",
    "remote", "alabama", "alaska", "arizona", "arkansas", "california", "colorado",
    "connecticut", "delaware", "florida", "hawaii", "idaho", "illinois", "indiana", "iowa",
    "kansas", "kentucky", "louisiana", "maine", "maryland", "massachusetts", "michigan",
    "minnesota", "mississippi", "missouri", "montana", "nebraska", "nevada",
    "new hampshire", "new jersey", "new mexico", "new york", "north carolina",
    "north dakota", "ohio", "oklahoma", "oregon", "pennsylvania", "rhode island",
    "south carolina", "south dakota", "tennessee", "texas", "utah", "vermont", "virginia",
    "washington", "west virginia", "wisconsin", "wyoming", "district of columbia",
    "new england",
];

const US_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV",
    "NH", "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN",
    "TX", "UT", "VT", "VA", "WA", "WV", "WI", "WY", "DC",
];

/// Letter-bounded alternation so `india` does not fire inside `indiana`.
fn token_pattern<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Regex {
    let alternation = tokens
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?:^|[^\p{{L}}])(?:{alternation})(?:[^\p{{L}}]|$)"))
        .unwrap_or_else(|e| panic!("location token pattern must compile: {e}"))
}

static NON_US_PATTERN: Lazy<Regex> = Lazy::new(|| {
    token_pattern(
        [NON_US_COUNTRIES, NON_US_CITIES, NON_US_REGIONS]
            .into_iter()
            .flatten()
            .copied(),
    )
});

static US_PATTERN: Lazy<Regex> = Lazy::new(|| token_pattern(US_TOKENS.iter().copied()));

// Multi-word US names are blanked before the non-US check: "new mexico" hides "mexico".
static US_COMPOUND_PATTERN: Lazy<Regex> = Lazy::new(|| {
    token_pattern(US_TOKENS.iter().copied().filter(|token| token.contains(' ')))
});

// Case-sensitive: "Austin, TX" or "(NY)" but not the word "in".
static US_STATE_CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?:[,(/\-|]\s*)(?:{})(?:\b|$)",
        US_STATE_CODES.join("|")
    ))
    .unwrap_or_else(|e| panic!("state code pattern must compile: {e}"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationClass {
    Usa,
    NonUsa,
    Unknown,
}

pub fn classify(location: &str) -> LocationClass {
    let text = location.trim();
    if text.is_empty() {
        return LocationClass::Unknown;
    }

    let lowered = text.to_lowercase();
    let masked = US_COMPOUND_PATTERN.replace_all(&lowered, " ");
    if NON_US_PATTERN.is_match(&masked) {
        LocationClass::NonUsa
    } else if US_PATTERN.is_match(&lowered) || US_STATE_CODE_PATTERN.is_match(text) {
        LocationClass::Usa
    } else {
        LocationClass::Unknown
    }
}

pub fn is_accepted(location: Option<&str>, usa_only: bool) -> bool {
    if !usa_only {
        return true;
    }
    match location {
        None => true,
        Some(text) => classify(text) != LocationClass::NonUsa,
    }
}
