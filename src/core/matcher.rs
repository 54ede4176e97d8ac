//! Scores recruiter profiles against a candidate's profile.
//!
//! Every rule is additive and independent. Reasons are recorded in the order
//! the rules are evaluated so the score can be explained.

use crate::search::query::LocationVocabulary;
use crate::search::SearchResultItem;
use crate::utils::text::title_case;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

const BASE_SCORE: u32 = 60;
const MAX_SCORE: u32 = 95;
const DEFAULT_REASON: &str = "General recruiter match";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    #[serde(alias = "junior")]
    Entry,
    #[default]
    Mid,
    Senior,
    Executive,
}

/// What the candidate looks like. Produced by resume analysis elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectProfile {
    pub skills: BTreeSet<String>,
    pub experience_level: ExperienceLevel,
    pub industry: String,
    pub role_types: BTreeSet<String>,
    pub preferred_locations: BTreeSet<String>,
    /// Companies the candidate has worked at.
    pub companies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub profile: SearchResultItem,
    pub score: u32,
    pub reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_company: Option<String>,
}

impl MatchResult {
    pub fn match_reason(&self) -> String {
        self.reasons.join("; ")
    }
}

const INDUSTRY_KEYWORDS: &[(&str, &[&str])] = &[
    ("software", &["technical", "engineering", "software", "developer", "tech"]),
    ("engineering", &["technical", "engineering", "software", "developer", "tech"]),
    ("technology", &["technical", "engineering", "software", "developer", "tech"]),
    ("data science", &["data", "analytics", "machine learning", "ai", "scientist"]),
    ("marketing", &["marketing", "digital", "growth", "brand", "content"]),
    ("finance", &["finance", "fintech", "banking", "financial", "investment"]),
    ("healthcare", &["healthcare", "medical", "biotech", "pharmaceutical", "clinical"]),
    ("consulting", &["consulting", "advisory", "strategy", "consultant"]),
    ("sales", &["sales", "business development", "account", "revenue"]),
    ("product", &["product", "design", "ux", "ui", "user experience"]),
    ("operations", &["operations", "logistics", "supply chain", "process"]),
];
const DEFAULT_INDUSTRY_KEYWORDS: &[&str] = &["technical", "engineering"];

const SKILL_CATEGORIES: &[(&str, &[&str])] = &[
    ("python", &["python", "django", "flask"]),
    ("javascript", &["javascript", "js", "node", "react", "angular", "vue"]),
    ("java", &["java", "spring", "kotlin"]),
    ("aws", &["aws", "amazon web services", "cloud"]),
    ("react", &["react", "frontend"]),
    ("machine learning", &["ml", "machine learning", "ai", "artificial intelligence"]),
    ("data science", &["data", "analytics", "science"]),
    ("devops", &["devops", "infrastructure", "deployment"]),
    ("mobile", &["mobile", "ios", "android", "react native", "flutter"]),
    ("backend", &["backend", "server", "api"]),
    ("frontend", &["frontend", "ui", "ux"]),
];

const ROLE_KEYWORDS: &[(&str, &[&str])] = &[
    ("engineer", &["engineer", "developer", "technical"]),
    ("manager", &["manager", "lead", "director"]),
    ("designer", &["designer", "ux", "ui"]),
    ("analyst", &["analyst", "data"]),
    ("scientist", &["scientist", "research"]),
    ("consultant", &["consultant", "advisory"]),
];

const HR_KEYWORDS: &[&str] = &["hr", "human resources", "people partner"];

const INDUSTRY_COMPANIES: &[(&[&str], &[&str])] = &[
    (&["software", "engineering", "tech"], &["Google", "Microsoft", "Apple", "Amazon", "Meta", "Netflix", "Uber"]),
    (&["data", "analytics"], &["Google", "Microsoft", "Amazon", "Netflix", "Airbnb", "Spotify"]),
    (&["marketing"], &["Google", "Meta", "Adobe", "Salesforce", "HubSpot"]),
    (&["finance", "fintech"], &["JPMorgan", "Goldman Sachs", "Stripe", "Square", "PayPal"]),
    (&["healthcare", "biotech"], &["Johnson & Johnson", "Pfizer", "Moderna", "Genentech"]),
    (&["consulting"], &["McKinsey", "Deloitte", "Accenture", "Boston Consulting Group"]),
    (&["automotive"], &["Tesla", "Ford", "General Motors", "BMW"]),
    (&["retail", "ecommerce", "e-commerce"], &["Amazon", "Shopify", "Walmart", "Target"]),
];
const DEFAULT_COMPANIES: &[&str] = &["Google", "Microsoft", "Apple", "Amazon", "Meta"];
const SENIOR_COMPANIES: &[&str] = &["Apple", "Microsoft", "Google", "Amazon"];
const ENTRY_COMPANIES: &[&str] = &["Uber", "Airbnb", "Spotify", "Slack", "Dropbox"];

/// Short terms ("hr", "ai", "ui") must appear as whole words; longer ones as substrings.
fn mentions(text: &str, term: &str) -> bool {
    if term.len() <= 3 && !term.contains(' ') {
        text.split(|c: char| !c.is_alphanumeric())
            .any(|word| word == term)
    } else {
        text.contains(term)
    }
}

fn mentions_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| mentions(text, term))
}

const ENTRY_KEYWORDS: &[&str] = &["entry", "junior", "new grad", "early career"];
const MID_KEYWORDS: &[&str] = &["mid-level", "mid level", "intermediate"];
const SENIOR_KEYWORDS: &[&str] = &["senior", "lead", "principal", "staff"];
const EXECUTIVE_KEYWORDS: &[&str] = &["executive", "c-level", "vp", "director"];

fn seniority_keywords(level: ExperienceLevel) -> (&'static [&'static str], u32, &'static str) {
    match level {
        ExperienceLevel::Entry => (ENTRY_KEYWORDS, 15, "Entry-level focus"),
        ExperienceLevel::Mid => (MID_KEYWORDS, 15, "Mid-level focus"),
        ExperienceLevel::Senior => (SENIOR_KEYWORDS, 15, "Senior-level focus"),
        ExperienceLevel::Executive => (EXECUTIVE_KEYWORDS, 20, "Executive-level focus"),
    }
}

pub struct ProfileMatcher {
    vocabulary: Arc<dyn LocationVocabulary>,
}

impl ProfileMatcher {
    pub fn new(vocabulary: Arc<dyn LocationVocabulary>) -> Self {
        Self { vocabulary }
    }

    /// Always within `[60, 95]`.
    pub fn score(&self, candidate: SearchResultItem, subject: &SubjectProfile) -> MatchResult {
        let text = format!("{} {}", candidate.title, candidate.snippet).to_lowercase();
        let location = candidate.qualifier_searched.as_deref().map(str::to_lowercase);
        let mut score = BASE_SCORE;
        let mut reasons = Vec::new();

        if let Some(loc) = location.as_deref() {
            let terms = self.vocabulary.related_terms(loc);
            if terms.iter().any(|term| mentions(&text, term)) {
                score += 15;
                reasons.push(format!("{} location match", title_case(loc)));
            }
        }

        let industry = subject.industry.to_lowercase();
        let industry_keywords = INDUSTRY_KEYWORDS
            .iter()
            .find(|(key, _)| industry.contains(key))
            .map(|(_, keywords)| *keywords)
            .unwrap_or(DEFAULT_INDUSTRY_KEYWORDS);
        if mentions_any(&text, industry_keywords) {
            score += 20;
            let label = if industry.is_empty() { "Technical".to_string() } else { title_case(&industry) };
            reasons.push(format!("{} recruiting focus", label));
        }

        let (keywords, bonus, reason) = seniority_keywords(subject.experience_level);
        if mentions_any(&text, keywords) {
            score += bonus;
            reasons.push(reason.to_string());
        }

        let skill_matches = matched_skill_categories(&subject.skills, &text);
        if !skill_matches.is_empty() {
            score += (skill_matches.len() as u32 * 3).min(15);
            let shown: Vec<&str> = skill_matches.iter().take(3).copied().collect();
            reasons.push(format!("Skills alignment ({})", shown.join(", ")));
        }

        if role_matches(&subject.role_types, &text) {
            score += 10;
            reasons.push("Role type alignment".to_string());
        }

        let worked_at = |kind: &str| subject.companies.iter().any(|c| c.to_lowercase().contains(kind));
        if text.contains("startup") && worked_at("startup") {
            score += 5;
            reasons.push("Startup focus".to_string());
        } else if text.contains("enterprise") && worked_at("enterprise") {
            score += 5;
            reasons.push("Enterprise focus".to_string());
        }

        if let Some(loc) = location.as_deref() {
            let aligned = subject.preferred_locations.iter().any(|preferred| {
                let preferred = preferred.to_lowercase();
                !preferred.is_empty() && (preferred.contains(loc) || loc.contains(&preferred))
            });
            if aligned {
                score += 10;
                reasons.push("Preferred location alignment".to_string());
            }
            if mentions_any(&text, HR_KEYWORDS) {
                score += 5;
                reasons.push("Local HR expertise".to_string());
            }
        }

        if reasons.is_empty() {
            reasons.push(DEFAULT_REASON.to_string());
        }

        MatchResult {
            profile: candidate,
            score: score.min(MAX_SCORE),
            reasons,
            target_company: None,
        }
    }
}

/// Skill categories the subject has that the recruiter text also mentions, in category order.
fn matched_skill_categories(skills: &BTreeSet<String>, text: &str) -> Vec<&'static str> {
    let mut matches: Vec<&'static str> = Vec::new();
    for skill in skills {
        let skill = skill.to_lowercase();
        let category = SKILL_CATEGORIES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| mentions(&skill, k)));
        if let Some((name, keywords)) = category {
            if mentions_any(text, keywords) && !matches.contains(name) {
                matches.push(name);
            }
        }
    }
    matches
}

fn role_matches(role_types: &BTreeSet<String>, text: &str) -> bool {
    role_types.iter().any(|role| {
        let role = role.to_lowercase();
        ROLE_KEYWORDS
            .iter()
            .any(|(category, keywords)| role.contains(category) && mentions_any(text, keywords))
    })
}

/// Companies worth searching for recruiters, deduplicated in order and capped at `max`.
pub fn target_companies(subject: &SubjectProfile, max: usize) -> Vec<String> {
    let industry = subject.industry.to_lowercase();
    let by_industry = INDUSTRY_COMPANIES
        .iter()
        .find(|(keys, _)| keys.iter().any(|k| industry.contains(k)))
        .map(|(_, companies)| *companies)
        .unwrap_or(DEFAULT_COMPANIES);

    let by_level: &[&str] = match subject.experience_level {
        ExperienceLevel::Senior | ExperienceLevel::Executive => SENIOR_COMPANIES,
        ExperienceLevel::Entry => ENTRY_COMPANIES,
        ExperienceLevel::Mid => &[],
    };

    let mut companies: Vec<String> = Vec::new();
    let candidates = by_industry
        .iter()
        .chain(by_level)
        .map(|c| c.to_string())
        .chain(subject.companies.iter().map(|c| c.trim().to_string()));
    for company in candidates {
        if company.is_empty() || companies.iter().any(|c| c.eq_ignore_ascii_case(&company)) {
            continue;
        }
        companies.push(company);
    }
    companies.truncate(max);
    companies
}

/// Accepts only public LinkedIn profile URLs.
pub fn validate_recruiter_profile(url: &str) -> bool {
    url.starts_with("https://linkedin.com/in/") || url.starts_with("https://www.linkedin.com/in/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::query::DefaultLocations;

    fn matcher() -> ProfileMatcher {
        ProfileMatcher::new(Arc::new(DefaultLocations))
    }

    fn profile(title: &str, snippet: &str, qualifier: Option<&str>) -> SearchResultItem {
        SearchResultItem {
            title: title.to_string(),
            url: "https://www.linkedin.com/in/someone".to_string(),
            snippet: snippet.to_string(),
            source_strategy: 0,
            qualifier_searched: qualifier.map(str::to_string),
            job: None,
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_rule_fires_gives_base_score() {
        let subject = SubjectProfile {
            industry: "marketing".into(),
            ..SubjectProfile::default()
        };
        let result = matcher().score(profile("Jane Doe", "Based somewhere", None), &subject);
        assert_eq!(result.score, 60);
        assert_eq!(result.reasons, vec![DEFAULT_REASON]);
    }

    #[test]
    fn city_qualifier_matches_local_spelling() {
        let subject = SubjectProfile {
            industry: "marketing".into(),
            ..SubjectProfile::default()
        };
        let result = matcher().score(profile("Jane Doe", "Talent partner in Bengaluru", Some("bangalore")), &subject);
        assert_eq!(result.score, 75);
        assert_eq!(result.reasons, vec!["Bangalore location match"]);
    }

    #[test]
    fn reasons_follow_rule_order() {
        let subject = SubjectProfile {
            skills: set(&["Python", "AWS"]),
            experience_level: ExperienceLevel::Senior,
            industry: "Software".into(),
            role_types: set(&["Backend Engineer"]),
            preferred_locations: set(&["Bangalore, India"]),
            companies: vec![],
        };
        let candidate = profile(
            "Senior Technical Recruiter - Acme",
            "Hiring python and cloud engineers in Bangalore",
            Some("india"),
        );
        let result = matcher().score(candidate, &subject);

        assert_eq!(
            result.reasons,
            vec![
                "India location match",
                "Software recruiting focus",
                "Senior-level focus",
                "Skills alignment (aws, python)",
                "Role type alignment",
                "Preferred location alignment",
            ]
        );
        assert_eq!(result.score, 95);
        assert!(result.match_reason().starts_with("India location match; "));
    }

    #[test]
    fn executive_bonus_is_larger() {
        let subject = SubjectProfile {
            experience_level: ExperienceLevel::Executive,
            industry: "marketing".into(),
            ..SubjectProfile::default()
        };
        let result = matcher().score(profile("VP Talent", "", None), &subject);
        assert_eq!(result.score, 80);
        assert_eq!(result.reasons, vec!["Executive-level focus"]);
    }

    #[test]
    fn short_terms_match_whole_words_only() {
        let subject = SubjectProfile {
            industry: "marketing".into(),
            ..SubjectProfile::default()
        };
        let threshold = matcher().score(profile("Recruiter", "Threshold matters", Some("uk")), &subject);
        assert!(!threshold.reasons.iter().any(|r| r.contains("HR")));

        let hr = matcher().score(profile("HR Business Partner", "", Some("uk")), &subject);
        assert!(hr.reasons.contains(&"Local HR expertise".to_string()));
        assert_eq!(hr.score, 65);
    }

    #[test]
    fn startup_bonus_needs_startup_history() {
        let mut subject = SubjectProfile {
            industry: "marketing".into(),
            ..SubjectProfile::default()
        };
        let candidate = profile("Startup recruiter", "", None);
        assert_eq!(matcher().score(candidate.clone(), &subject).score, 60);

        subject.companies = vec!["Tiny Startup Labs".into()];
        assert_eq!(matcher().score(candidate, &subject).score, 65);
    }

    #[test]
    fn scores_stay_in_bounds() {
        let subject = SubjectProfile {
            skills: set(&["python", "java", "aws", "react", "ml", "devops"]),
            experience_level: ExperienceLevel::Executive,
            industry: "software".into(),
            role_types: set(&["engineer", "manager"]),
            preferred_locations: set(&["india"]),
            companies: vec!["startup".into()],
        };
        let loaded = profile(
            "Executive Director HR startup technical recruiter india",
            "python django java spring aws cloud react frontend ml devops engineer manager",
            Some("india"),
        );
        let result = matcher().score(loaded, &subject);
        assert_eq!(result.score, 95);

        let empty = matcher().score(profile("", "", None), &SubjectProfile::default());
        assert!((60..=95).contains(&empty.score));
    }

    #[test]
    fn experience_level_accepts_junior_alias() {
        let level: ExperienceLevel = serde_json::from_str("\"junior\"").unwrap();
        assert_eq!(level, ExperienceLevel::Entry);
    }

    #[test]
    fn target_companies_dedup_and_cap() {
        let subject = SubjectProfile {
            industry: "Finance".into(),
            experience_level: ExperienceLevel::Senior,
            companies: vec!["stripe".into(), "Revolut".into()],
            ..SubjectProfile::default()
        };
        assert_eq!(
            target_companies(&subject, 5),
            vec!["JPMorgan", "Goldman Sachs", "Stripe", "Square", "PayPal"]
        );
        assert_eq!(
            target_companies(&subject, 12),
            vec!["JPMorgan", "Goldman Sachs", "Stripe", "Square", "PayPal", "Apple", "Microsoft", "Google", "Amazon", "Revolut"]
        );
        assert_eq!(target_companies(&SubjectProfile::default(), 5), DEFAULT_COMPANIES);
    }

    #[test]
    fn recruiter_profile_urls() {
        assert!(validate_recruiter_profile("https://www.linkedin.com/in/jane"));
        assert!(validate_recruiter_profile("https://linkedin.com/in/jane"));
        assert!(!validate_recruiter_profile("http://www.linkedin.com/in/jane"));
        assert!(!validate_recruiter_profile("https://www.linkedin.com/company/acme"));
    }
}
