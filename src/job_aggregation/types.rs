// src/job_aggregation/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::hasher::canonical_hash;

/// Applicant-tracking systems the aggregator knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Greenhouse,
    Lever,
    SmartRecruiters,
    AshbyHq,
    Jobvite,
    JazzHr,
    BambooHr,
    Workday,
    Icims,
    Taleo,
    SuccessFactors,
}

impl Platform {
    pub const ALL: [Platform; 11] = [
        Platform::Greenhouse,
        Platform::Lever,
        Platform::SmartRecruiters,
        Platform::AshbyHq,
        Platform::Jobvite,
        Platform::JazzHr,
        Platform::BambooHr,
        Platform::Workday,
        Platform::Icims,
        Platform::Taleo,
        Platform::SuccessFactors,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Platform::Greenhouse => "greenhouse",
            Platform::Lever => "lever",
            Platform::SmartRecruiters => "smartrecruiters",
            Platform::AshbyHq => "ashbyhq",
            Platform::Jobvite => "jobvite",
            Platform::JazzHr => "jazzhr",
            Platform::BambooHr => "bamboohr",
            Platform::Workday => "workday",
            Platform::Icims => "icims",
            Platform::Taleo => "taleo",
            Platform::SuccessFactors => "successfactors",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Greenhouse => "Greenhouse",
            Platform::Lever => "Lever",
            Platform::SmartRecruiters => "SmartRecruiters",
            Platform::AshbyHq => "AshbyHQ",
            Platform::Jobvite => "Jobvite",
            Platform::JazzHr => "JazzHR",
            Platform::BambooHr => "BambooHR",
            Platform::Workday => "Workday",
            Platform::Icims => "iCIMS",
            Platform::Taleo => "Taleo (Oracle)",
            Platform::SuccessFactors => "SuccessFactors (SAP)",
        }
    }

    /// Enterprise systems whose listing APIs sit behind credentials we do not hold.
    pub fn is_stub(self) -> bool {
        matches!(
            self,
            Platform::Workday | Platform::Icims | Platform::Taleo | Platform::SuccessFactors
        )
    }

    /// Platforms scraped when the caller does not pick any.
    pub fn default_selection() -> Vec<Platform> {
        Self::ALL.into_iter().filter(|p| !p.is_stub()).collect()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        match wanted.as_str() {
            "ashby" => return Ok(Platform::AshbyHq),
            "sap" | "sap-successfactors" => return Ok(Platform::SuccessFactors),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|p| p.id() == wanted)
            .ok_or_else(|| anyhow::anyhow!("Unknown ATS platform: {}", s))
    }
}

/// One discovered listing, normalized across platforms.
///
/// Wire names match the persisted `job_links` layout so stored rows and API
/// payloads read the same.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(rename = "job_url")]
    pub url: String,
    #[serde(rename = "job_url_hash")]
    pub url_hash: String,
    #[serde(rename = "job_title")]
    pub title: Option<String>,
    #[serde(rename = "company_name")]
    pub company: Option<String>,
    #[serde(rename = "ats_platform")]
    pub platform: Platform,
    pub location: Option<String>,
    #[serde(rename = "posting_date")]
    pub posted_at: Option<DateTime<Utc>>,
}

impl JobPosting {
    pub fn new(url: impl Into<String>, platform: Platform) -> Self {
        let url = url.into();
        let url_hash = canonical_hash(&url);
        Self {
            url,
            url_hash,
            title: None,
            company: None,
            platform,
            location: None,
            posted_at: None,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        self
    }

    pub fn with_company(mut self, company: Option<String>) -> Self {
        self.company = company.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        self
    }

    pub fn with_posted_at(mut self, posted_at: Option<DateTime<Utc>>) -> Self {
        self.posted_at = posted_at;
        self
    }
}

/// Turn a tenant slug into a display name: `stripe` -> `Stripe`.
pub fn display_company(slug: &str) -> String {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_ids_round_trip_through_from_str() {
        for platform in Platform::ALL {
            assert_eq!(platform.id().parse::<Platform>().unwrap(), platform);
        }
        assert_eq!("  Greenhouse ".parse::<Platform>().unwrap(), Platform::Greenhouse);
        assert_eq!("ashby".parse::<Platform>().unwrap(), Platform::AshbyHq);
        assert!("monster".parse::<Platform>().is_err());
    }

    #[test]
    fn default_selection_skips_stub_platforms() {
        let defaults = Platform::default_selection();
        assert_eq!(defaults.len(), 7);
        assert!(defaults.iter().all(|p| !p.is_stub()));
        assert!(defaults.contains(&Platform::JazzHr));
    }

    #[test]
    fn serializes_with_persisted_field_names() {
        let posting = JobPosting::new("https://jobs.lever.co/acme/1", Platform::Lever)
            .with_title(Some("  Data Engineer ".to_string()))
            .with_location(Some("   ".to_string()));

        let value = serde_json::to_value(&posting).unwrap();
        assert_eq!(value["job_url"], "https://jobs.lever.co/acme/1");
        assert_eq!(value["job_title"], "Data Engineer");
        assert_eq!(value["ats_platform"], "lever");
        assert!(value["location"].is_null());
        assert_eq!(value["job_url_hash"], canonical_hash("https://jobs.lever.co/acme/1"));
    }

    #[test]
    fn display_company_capitalizes_slug() {
        assert_eq!(display_company("stripe"), "Stripe");
        assert_eq!(display_company(""), "");
    }
}
