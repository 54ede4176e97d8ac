//! Ordered query variants for each kind of search.
//!
//! Order matters: the external API is billed per call, so the most precise
//! phrasings come first and the broad ones last.

use super::query::ParsedTarget;
use super::{SearchMode, SearchStrategy};
use crate::core::config::Config;
use crate::utils::domain::slug_company;
use crate::utils::phone::CountryHint;
use crate::utils::text::title_case;

const LINKEDIN_PROFILES: &str = "site:linkedin.com/in/";

#[derive(Debug, Clone, Copy)]
pub struct StrategyGenerator {
    max_recruiter: usize,
    max_job: usize,
}

impl Default for StrategyGenerator {
    fn default() -> Self {
        Self::new(10, 8)
    }
}

fn numbered(queries: Vec<String>) -> Vec<SearchStrategy> {
    queries
        .into_iter()
        .enumerate()
        .map(|(ordinal, query)| SearchStrategy { query, ordinal })
        .collect()
}

impl StrategyGenerator {
    pub fn new(max_recruiter: usize, max_job: usize) -> Self {
        Self {
            max_recruiter: max_recruiter.max(1),
            max_job: max_job.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_recruiter_strategies, config.max_job_strategies)
    }

    pub fn generate(&self, target: &ParsedTarget, mode: SearchMode) -> Vec<SearchStrategy> {
        match mode {
            SearchMode::Recruiter => self.recruiter_strategies(target),
            SearchMode::Job => self.job_strategies(target),
        }
    }

    /// LinkedIn profile queries. Qualified phrasings in both word orders come
    /// first; the last three are entity-only so a global fallback is always tried.
    fn recruiter_strategies(&self, target: &ParsedTarget) -> Vec<SearchStrategy> {
        let c = target.entity.as_str();
        let phrasings: Vec<String> = match target.qualifier.as_deref() {
            Some(l) => vec![
                format!("{c} recruiter {l}"),
                format!("{c} hiring {l}"),
                format!("{c} talent {l}"),
                format!("{c} {l} recruiter"),
                format!("{c} {l} hiring manager"),
                format!("recruiter {c} {l}"),
                format!("hiring manager {c} {l}"),
                format!("{c} recruiter"),
                format!("{c} hiring manager"),
                format!("{c} talent acquisition"),
            ],
            None => vec![
                format!("{c} recruiter"),
                format!("{c} hiring manager"),
                format!("{c} talent acquisition"),
                format!("{c} hr manager"),
                format!("{c} people partner"),
                format!("recruiter {c}"),
                format!("hiring manager {c}"),
                format!("talent acquisition {c}"),
            ],
        };

        let mut queries: Vec<String> = phrasings
            .into_iter()
            .map(|p| format!("{LINKEDIN_PROFILES} {p}"))
            .collect();

        if target.qualifier.is_some() && queries.len() > self.max_recruiter {
            // Keep the entity-only tail inside the cap.
            let fallback = queries.split_off(queries.len() - 1);
            queries.truncate(self.max_recruiter.saturating_sub(1));
            queries.extend(fallback);
            queries.truncate(self.max_recruiter);
        } else {
            queries.truncate(self.max_recruiter);
        }
        numbered(queries)
    }

    /// Job-board restrictions, career-site guesses and general phrasings.
    ///
    /// The India-specific board is only included for Indian qualifiers. With a
    /// qualifier, the last slot is always an entity-only query.
    fn job_strategies(&self, target: &ParsedTarget) -> Vec<SearchStrategy> {
        let c = target.entity.as_str();
        let slug = slug_company(c);

        let mut queries: Vec<String> = match target.qualifier.as_deref() {
            Some(q) => {
                let l = title_case(q);
                let mut qualified = vec![
                    format!("site:linkedin.com/jobs {c} {l} jobs"),
                    format!("site:indeed.com {c} {l} jobs"),
                    format!("site:glassdoor.com {c} {l} jobs"),
                ];
                if CountryHint::from_qualifier(q) == Some(CountryHint::India) {
                    qualified.push(format!("site:naukri.com {c} {l} jobs"));
                }
                qualified.extend([
                    format!("site:{slug}.com careers {l}"),
                    format!("{c} careers {l} hiring"),
                    format!("{c} job openings {l}"),
                    format!("\"{c}\" hiring {l} openings"),
                ]);
                qualified.truncate(self.max_job.saturating_sub(1));
                qualified.push(format!("site:linkedin.com/jobs {c} jobs"));
                qualified
            }
            None => vec![
                format!("site:linkedin.com/jobs {c} jobs"),
                format!("site:indeed.com {c} jobs"),
                format!("site:glassdoor.com {c} jobs"),
                format!("site:monster.com {c} jobs"),
                format!("site:{slug}.com careers"),
                format!("site:{slug}.com jobs"),
                format!("{c} careers hiring"),
                format!("{c} job openings"),
                format!("\"{c}\" hiring openings"),
                format!("{c} recruitment positions"),
            ],
        };
        queries.truncate(self.max_job);
        numbered(queries)
    }

    /// Wider LinkedIn phrasings tried only when every primary recruiter strategy came back empty.
    pub fn broad_recruiter_fallback(&self, target: &ParsedTarget) -> Vec<SearchStrategy> {
        let c = target.entity.as_str();
        let mut queries = vec![
            format!("{c} linkedin recruiter"),
            format!("{c} linkedin hiring"),
            format!("{c} linkedin talent"),
            format!("linkedin.com {c} recruiter"),
            format!("site:linkedin.com {c} talent acquisition"),
            format!("site:linkedin.com {c} hiring manager"),
        ];
        if let Some(l) = target.qualifier.as_deref() {
            queries.extend([
                format!("{c} {l} linkedin recruiter"),
                format!("linkedin.com {c} {l}"),
                format!("site:linkedin.com {c} {l} recruiter"),
            ]);
        }
        numbered(queries)
    }

    /// Person + company queries aimed at pages that list contact details.
    pub fn phone_strategies(
        &self,
        first: &str,
        last: &str,
        company: &str,
        company_domain: &str,
    ) -> Vec<SearchStrategy> {
        let name = format!("{} {}", first.trim(), last.trim());
        let co = company.trim();
        numbered(vec![
            format!("site:linkedin.com \"{name}\" \"{co}\" contact"),
            format!("site:linkedin.com \"{name}\" \"{co}\" phone"),
            format!("site:linkedin.com \"{name}\" mobile email contact"),
            format!("site:{company_domain} \"{name}\" contact"),
            format!("site:{company_domain} \"{name}\" phone"),
            format!("\"{co}\" directory \"{name}\" contact information"),
            format!("site:xing.com \"{name}\" \"{co}\" contact"),
            format!("site:about.me \"{name}\" \"{co}\" phone"),
            format!("site:crunchbase.com \"{name}\" \"{co}\" contact"),
            format!("\"{name}\" \"{co}\" business card contact"),
            format!("\"{name}\" \"{co}\" vcard contact information"),
            format!("\"{name}\" \"{co}\" \"contact me\" phone"),
            format!("\"{name}\" \"{co}\" speaker contact"),
            format!("\"{name}\" \"{co}\" conference bio contact"),
            format!("\"{name}\" \"{co}\" india contact phone"),
            format!("\"{name}\" \"{co}\" mumbai bangalore contact"),
            format!("\"{name}\" \"{co}\" uk london contact phone"),
            format!("\"{name}\" \"{co}\" usa contact information"),
        ])
    }
}
