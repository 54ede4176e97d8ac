//! Job-posting classification and field extraction from raw search items.

use crate::utils::text::title_case;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::fmt;
use url::Url;

const JOB_KEYWORDS: &[&str] = &[
    "job", "jobs", "career", "careers", "hiring", "opening", "openings", "position",
    "positions", "vacancy", "vacancies", "recruitment", "apply", "application", "candidate",
    "employment", "work at",
];

const JOB_SITES: &[&str] = &[
    "linkedin.com/jobs", "indeed.com", "glassdoor.com", "naukri.com", "monster.com",
    "ziprecruiter.com", "simplyhired.com", "dice.com", "careers", "jobs",
];

const EXCLUDE_KEYWORDS: &[&str] = &[
    "news", "article", "blog", "wikipedia", "about us", "company profile", "stock",
    "financial", "investor", "press release",
];

const TITLE_SUFFIXES: &[&str] = &[
    "- Indeed.com", "- LinkedIn", "- Glassdoor", "- Naukri.com", "- Monster.com",
    "| Indeed.com", "| LinkedIn", "| Glassdoor",
];

const COMPANY_SEPARATORS: &[&str] = &[" at ", " with ", " - ", " | ", " for ", " by "];

/// Case-insensitive separator matchers, run against the original title so
/// byte offsets stay on char boundaries.
static COMPANY_SEPARATOR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    COMPANY_SEPARATORS
        .iter()
        .filter_map(|sep| {
            RegexBuilder::new(&regex::escape(sep))
                .case_insensitive(true)
                .build()
                .ok()
        })
        .collect()
});

const LOCATION_KEYWORDS: &[&str] = &[
    "remote", "hybrid", "onsite", "bangalore", "mumbai", "delhi", "hyderabad", "pune",
    "chennai", "gurgaon", "noida", "london", "new york", "san francisco", "seattle", "chicago",
    "toronto", "sydney", "berlin", "paris", "tokyo",
];

const JOB_TYPES: &[(&str, &str)] = &[
    ("full-time", "Full-time"),
    ("full time", "Full-time"),
    ("part-time", "Part-time"),
    ("part time", "Part-time"),
    ("contract", "Contract"),
    ("freelance", "Freelance"),
    ("internship", "Internship"),
    ("intern", "Internship"),
    ("temporary", "Temporary"),
    ("permanent", "Permanent"),
    ("remote", "Remote"),
];

static POSTED_DATE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"posted\s+\d{1,2}\s+(?:days?|hours?|weeks?)\s+ago",
        r"\d{1,2}\s+(?:days?|hours?|weeks?)\s+ago",
        r"\d{1,2}[dh]\s+ago",
        r"\bjust posted\b",
        r"\btoday\b",
        r"\byesterday\b",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static SALARY: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"[\$₹£€]\s*\d{1,3}(?:,\d{3})*(?:\.\d{2})?(?:\s*-\s*[\$₹£€]?\s*\d{1,3}(?:,\d{3})*(?:\.\d{2})?)?",
        r"\d{1,3}(?:,\d{3})*\s*(?:lpa|per annum|per year|per month|/year|/month)",
        r"\d+k\s*-\s*\d+k",
        r"\d+\s*lakh",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Where a posting was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobSource {
    LinkedIn,
    Indeed,
    Glassdoor,
    Naukri,
    Monster,
    ZipRecruiter,
    SimplyHired,
    Dice,
    #[serde(rename = "Company Career Page")]
    CompanyCareerPage,
    Other,
}

impl JobSource {
    pub fn from_url(url: &str) -> Self {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
            .unwrap_or_default();

        const BOARDS: &[(&str, JobSource)] = &[
            ("linkedin.com", JobSource::LinkedIn),
            ("indeed.com", JobSource::Indeed),
            ("glassdoor.com", JobSource::Glassdoor),
            ("naukri.com", JobSource::Naukri),
            ("monster.com", JobSource::Monster),
            ("ziprecruiter.com", JobSource::ZipRecruiter),
            ("simplyhired.com", JobSource::SimplyHired),
            ("dice.com", JobSource::Dice),
        ];
        if let Some((_, source)) = BOARDS.iter().find(|(domain, _)| host.contains(domain)) {
            return *source;
        }
        if host.contains("careers") || host.contains("jobs") {
            JobSource::CompanyCareerPage
        } else {
            JobSource::Other
        }
    }

    /// Ranking bonus for results from this source.
    pub fn credibility(self) -> u32 {
        match self {
            JobSource::CompanyCareerPage => 30,
            JobSource::LinkedIn => 25,
            JobSource::Indeed | JobSource::Glassdoor => 20,
            JobSource::Naukri => 18,
            JobSource::Monster => 15,
            _ => 10,
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobSource::LinkedIn => "LinkedIn",
            JobSource::Indeed => "Indeed",
            JobSource::Glassdoor => "Glassdoor",
            JobSource::Naukri => "Naukri",
            JobSource::Monster => "Monster",
            JobSource::ZipRecruiter => "ZipRecruiter",
            JobSource::SimplyHired => "SimplyHired",
            JobSource::Dice => "Dice",
            JobSource::CompanyCareerPage => "Company Career Page",
            JobSource::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Fields pulled out of a job-posting search item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetails {
    #[serde(rename = "job_title")]
    pub title: String,
    pub company: String,
    pub location: String,
    pub source: JobSource,
    pub posted_date: String,
    pub job_type: String,
    pub salary: String,
    pub found_timestamp: String,
}

impl JobDetails {
    pub fn extract(title: &str, url: &str, snippet: &str, searched_location: Option<&str>) -> Self {
        Self {
            title: clean_job_title(title),
            company: extract_company(title, snippet),
            location: extract_location(title, snippet, searched_location),
            source: JobSource::from_url(url),
            posted_date: extract_posted_date(snippet),
            job_type: extract_job_type(title, snippet),
            salary: extract_salary(snippet),
            found_timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Positive job signal (keyword or job-board URL) and no exclusion keyword.
pub fn is_job_posting(title: &str, url: &str, snippet: &str) -> bool {
    let title = title.to_lowercase();
    let snippet = snippet.to_lowercase();
    let url = url.to_lowercase();
    let mentions = |k: &&str| title.contains(*k) || snippet.contains(*k);

    let has_job_keywords = JOB_KEYWORDS.iter().any(mentions);
    let is_job_site = JOB_SITES.iter().any(|site| url.contains(site));
    let excluded = EXCLUDE_KEYWORDS.iter().any(mentions);

    (has_job_keywords || is_job_site) && !excluded
}

fn clean_job_title(title: &str) -> String {
    let mut cleaned = title.to_string();
    for suffix in TITLE_SUFFIXES {
        cleaned = cleaned.replace(suffix, "");
    }
    cleaned.trim().to_string()
}

fn extract_company(title: &str, snippet: &str) -> String {
    let cleaned = clean_job_title(title);
    for separator in COMPANY_SEPARATOR_PATTERNS.iter() {
        if let Some(found) = separator.find_iter(&cleaned).last() {
            let tail = &cleaned[found.end()..];
            let company = tail
                .split('(')
                .next()
                .unwrap_or_default()
                .split('-')
                .next()
                .unwrap_or_default()
                .trim();
            if !company.is_empty() {
                return company.to_string();
            }
        }
    }

    let words: Vec<&str> = snippet.split_whitespace().collect();
    words
        .windows(2)
        .find(|pair| matches!(pair[0].to_lowercase().as_str(), "at" | "with"))
        .map(|pair| pair[1].trim_matches(|c| c == '.' || c == ','))
        .filter(|company| !company.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "Company Not Specified".to_string())
}

fn extract_location(title: &str, snippet: &str, searched_location: Option<&str>) -> String {
    let text = format!("{} {}", title, snippet).to_lowercase();
    if let Some(keyword) = LOCATION_KEYWORDS.iter().find(|k| text.contains(*k)) {
        return title_case(keyword);
    }
    searched_location
        .map(title_case)
        .unwrap_or_else(|| "Location Not Specified".to_string())
}

fn extract_posted_date(snippet: &str) -> String {
    let lower = snippet.to_lowercase();
    POSTED_DATE
        .iter()
        .find_map(|re| re.find(&lower).map(|m| m.as_str().to_string()))
        .unwrap_or_else(|| "Date Not Specified".to_string())
}

fn extract_job_type(title: &str, snippet: &str) -> String {
    let text = format!("{} {}", title, snippet).to_lowercase();
    JOB_TYPES
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| "Not Specified".to_string())
}

fn extract_salary(snippet: &str) -> String {
    let lower = snippet.to_lowercase();
    SALARY
        .iter()
        .find_map(|re| re.find(&lower).map(|m| m.as_str().to_string()))
        .unwrap_or_else(|| "Salary Not Specified".to_string())
}

/// Freshness bonus read from a posted-date string.
pub fn recency_bonus(posted_date: &str) -> u32 {
    let posted = posted_date.to_lowercase();
    if posted.contains("hour") || posted.contains("today") || posted.contains("just posted") {
        15
    } else if posted.contains("day") && posted.contains('1') {
        10
    } else if posted.contains("week") && posted.contains('1') {
        5
    } else {
        0
    }
}
