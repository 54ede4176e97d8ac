use crate::core::cache::TtlCache;
use crate::core::config::{get_random_sleep_duration, Config};
use crate::core::error::{AppError, Result};
use crate::core::matcher::{target_companies, MatchResult, ProfileMatcher, SubjectProfile};
use crate::core::models::{ContactReport, EmailReport, PhoneReport, ValidationOutcome};
use crate::search::aggregate::PhoneStopPolicy;
use crate::search::gateway::{CustomSearchGateway, SearchGateway, SearchRequest};
use crate::search::messages::{no_mx_message, no_results_message};
use crate::search::{
    AggregateResult, ParsedTarget, QueryParser, ResultFilter, SearchMode, SearchOutcome,
    SearchResultItem, SearchStrategy, StrategyGenerator,
};
use crate::utils::dns::{resolve_with_fallback, DnsMxResolver, MxResolver};
use crate::utils::domain::{get_domain_from_url, CompanyDomainLookup, KnownCompanyDomains};
use crate::utils::fetch::{HttpPageFetcher, PageFetcher};
use crate::utils::patterns::{extract_letters_only, generate_email_patterns, validate_name_format};
use crate::utils::phone::{extract_phone_numbers, CountryHint, PhoneCandidate, PhoneRegion};
use crate::utils::smtp::{MailboxProbe, SmtpVerifier};
use crate::utils::text::title_case;

use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;

const HIGH_VALUE_SOURCES: &[&str] = &["linkedin.com", "crunchbase.com", "about.me", "xing.com"];
const CONTACT_TITLE_WORDS: &[&str] = &["contact", "phone", "mobile", "profile"];
const BROAD_TITLE_WORDS: &[&str] = &["recruiter", "hiring", "talent", "hr"];
const MIN_COMPANY_CHARS: usize = 2;

/// The collaborators a [`RecruiterSleuth`] talks to.
///
/// `search` is `None` when no search API credentials are configured; every
/// search-backed operation then fails with [`AppError::SearchNotConfigured`].
pub struct SleuthParts {
    pub search: Option<Arc<dyn SearchGateway>>,
    pub resolver: Arc<dyn MxResolver>,
    pub probe: Arc<dyn MailboxProbe>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub domains: Arc<dyn CompanyDomainLookup>,
    pub parser: Arc<QueryParser>,
}

/// Orchestrates recruiter search, job search and contact discovery.
pub struct RecruiterSleuth {
    config: Arc<Config>,
    search: Option<Arc<dyn SearchGateway>>,
    resolver: Arc<dyn MxResolver>,
    probe: Arc<dyn MailboxProbe>,
    fetcher: Arc<dyn PageFetcher>,
    domains: Arc<dyn CompanyDomainLookup>,
    parser: Arc<QueryParser>,
    strategies: StrategyGenerator,
    matcher: ProfileMatcher,
    cache: Arc<TtlCache<SearchOutcome>>,
}

impl RecruiterSleuth {
    /// Builds the production collaborators from `config`.
    pub fn new(config: &Config) -> Result<Self> {
        tracing::debug!("Initializing RecruiterSleuth components...");
        let config = Arc::new(config.clone());

        let search: Option<Arc<dyn SearchGateway>> = match CustomSearchGateway::new(&config) {
            Ok(gateway) => Some(Arc::new(gateway)),
            Err(AppError::SearchNotConfigured) => {
                tracing::warn!("Search API credentials missing; recruiter, job and phone search are disabled.");
                None
            }
            Err(e) => return Err(e),
        };
        tracing::debug!("Search gateway initialized.");

        let parts = SleuthParts {
            search,
            resolver: Arc::new(DnsMxResolver::new(&config)),
            probe: Arc::new(SmtpVerifier::new(Arc::clone(&config))),
            fetcher: Arc::new(HttpPageFetcher::new(&config)?),
            domains: Arc::new(KnownCompanyDomains),
            parser: Arc::new(QueryParser::default()),
        };
        let cache = Arc::new(TtlCache::new(config.cache_ttl));

        tracing::info!("RecruiterSleuth initialized successfully.");
        Ok(Self::from_parts(config, parts, cache))
    }

    pub fn from_parts(config: Arc<Config>, parts: SleuthParts, cache: Arc<TtlCache<SearchOutcome>>) -> Self {
        let vocabulary = parts.parser.vocabulary_handle();
        Self {
            strategies: StrategyGenerator::from_config(&config),
            matcher: ProfileMatcher::new(vocabulary),
            config,
            search: parts.search,
            resolver: parts.resolver,
            probe: parts.probe,
            fetcher: parts.fetcher,
            domains: parts.domains,
            parser: parts.parser,
            cache,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &TtlCache<SearchOutcome> {
        &self.cache
    }

    fn gateway(&self) -> Result<&Arc<dyn SearchGateway>> {
        self.search.as_ref().ok_or(AppError::SearchNotConfigured)
    }

    /// LinkedIn recruiter profiles for a "company [location]" query.
    ///
    /// Falls back to broader phrasings when every primary strategy comes back empty.
    pub async fn search_recruiters(&self, raw_query: &str, max_results: usize) -> Result<SearchOutcome> {
        let raw = validate_company(raw_query)?;
        let target = self.parser.parse(raw);
        validate_entity(&target)?;
        let gateway = self.gateway()?;
        let max_results = max_results.max(1);

        let cache_key = format!("recruiter|{}|{}", raw.to_lowercase(), max_results);
        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!(target: "search_task", "Cache hit for '{}'", raw);
            return Ok(cached);
        }

        tracing::info!(target: "search_task", "Searching for recruiters at: {}{}",
            target.entity,
            target.qualifier.as_deref().map(|q| format!(" in {}", q)).unwrap_or_default());

        let strategies = self.strategies.generate(&target, SearchMode::Recruiter);
        let (mut aggregate, mut tried) = self
            .run_strategies(gateway.as_ref(), &target, SearchMode::Recruiter, &strategies, max_results)
            .await;

        if aggregate.is_empty() {
            tracing::info!(target: "search_task", "No profiles from primary strategies, trying broad fallback");
            let broad = self.strategies.broad_recruiter_fallback(&target);
            for strategy in &broad {
                let request = self.request_for(strategy, &target, SearchMode::Recruiter, max_results);
                tried += 1;
                match gateway.execute(&request).await {
                    Ok(items) => {
                        let relevant: Vec<SearchResultItem> = items
                            .into_iter()
                            .filter(|item| title_mentions_recruiting(&item.title))
                            .collect();
                        if !relevant.is_empty() {
                            aggregate = aggregate.merge(relevant);
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(target: "search_task", "Broad strategy '{}' failed: {}", strategy.query, e);
                    }
                }
                sleep(get_random_sleep_duration(&self.config)).await;
            }
        }

        let outcome = self.finish(target, SearchMode::Recruiter, aggregate, tried, max_results);
        if !outcome.results.is_empty() {
            self.cache.set(cache_key, outcome.clone());
        }
        Ok(outcome)
    }

    /// Job postings for a company, optionally in a location.
    ///
    /// With no explicit `location`, a location inside `company` is parsed out.
    pub async fn search_jobs(&self, company: &str, location: Option<&str>, max_results: usize) -> Result<SearchOutcome> {
        let company = validate_company(company)?;
        let location = location.map(str::trim).filter(|l| !l.is_empty());
        let target = match location {
            Some(loc) => ParsedTarget::new(company, Some(loc)),
            None => self.parser.parse(company),
        };
        validate_entity(&target)?;
        let gateway = self.gateway()?;
        let max_results = max_results.max(1);

        let cache_key = format!(
            "job|{}|{}|{}",
            target.entity.to_lowercase(),
            target.qualifier.as_deref().unwrap_or(""),
            max_results
        );
        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!(target: "search_task", "Cache hit for jobs at '{}'", company);
            return Ok(cached);
        }

        tracing::info!(target: "search_task", "Searching for jobs at: {}{}",
            target.entity,
            target.qualifier.as_deref().map(|q| format!(" in {}", q)).unwrap_or_default());

        let strategies = self.strategies.generate(&target, SearchMode::Job);
        let (aggregate, tried) = self
            .run_strategies(gateway.as_ref(), &target, SearchMode::Job, &strategies, max_results)
            .await;

        let outcome = self.finish(target, SearchMode::Job, aggregate, tried, max_results);
        if !outcome.results.is_empty() {
            self.cache.set(cache_key, outcome.clone());
        }
        Ok(outcome)
    }

    fn request_for(&self, strategy: &SearchStrategy, target: &ParsedTarget, mode: SearchMode, limit: usize) -> SearchRequest {
        let qualifier = target.qualifier.as_deref();
        let country = qualifier.and_then(|q| self.parser.vocabulary().country_code(q));
        let request = SearchRequest::new(strategy, limit, mode.filter()).qualifier(qualifier, country);
        match mode {
            SearchMode::Job => request.english_only(),
            SearchMode::Recruiter => request,
        }
    }

    /// Runs strategies in order until `max_results` distinct results are gathered.
    /// Failed calls are logged and skipped.
    async fn run_strategies(
        &self,
        gateway: &dyn SearchGateway,
        target: &ParsedTarget,
        mode: SearchMode,
        strategies: &[SearchStrategy],
        max_results: usize,
    ) -> (AggregateResult, usize) {
        let mut aggregate = AggregateResult::new(mode, &target.entity, target.qualifier.as_deref());
        let mut tried = 0;

        for strategy in strategies {
            if tried > 0 {
                let sleep_dur = get_random_sleep_duration(&self.config);
                tracing::trace!(target: "search_task", "Sleeping {:?} before next strategy", sleep_dur);
                sleep(sleep_dur).await;
            }
            tried += 1;
            tracing::info!(target: "search_task", "Trying {} strategy {}: {}", mode.label(), strategy.ordinal + 1, strategy.query);

            let request = self.request_for(strategy, target, mode, max_results);
            match gateway.execute(&request).await {
                Ok(items) => {
                    let before = aggregate.len();
                    aggregate = aggregate.merge(items);
                    tracing::debug!(target: "search_task", "Strategy {} added {} new results", strategy.ordinal + 1, aggregate.len() - before);
                }
                Err(e) => {
                    tracing::warn!(target: "search_task", "Search strategy {} failed: {}", strategy.ordinal + 1, e);
                }
            }

            if aggregate.len() >= max_results {
                tracing::debug!(target: "search_task", "Reached {} results, stopping", max_results);
                break;
            }
        }
        (aggregate, tried)
    }

    fn finish(
        &self,
        target: ParsedTarget,
        mode: SearchMode,
        aggregate: AggregateResult,
        strategies_tried: usize,
        max_results: usize,
    ) -> SearchOutcome {
        let total_found = aggregate.len();
        let mut results = aggregate.into_ranked();
        results.truncate(max_results);

        let message = results
            .is_empty()
            .then(|| no_results_message(&target, mode, self.parser.vocabulary()));
        tracing::info!(target: "search_task", "Found {} unique {} results for {} after {} strategies",
            total_found, mode.label(), target.entity, strategies_tried);

        SearchOutcome {
            mode,
            target,
            results,
            total_found,
            strategies_tried,
            message,
        }
    }

    /// Generates address patterns and probes each against the domain's mail exchangers.
    ///
    /// Names must match `^[a-zA-Z\s'.\-]+$`. When the domain has no MX records, its
    /// alternates are tried and the first that resolves becomes the reported domain.
    pub async fn guess_emails(&self, first_name: &str, last_name: &str, domain: &str) -> Result<EmailReport> {
        let (first_name, last_name, domain_input) = (first_name.trim(), last_name.trim(), domain.trim());
        if first_name.is_empty() || last_name.is_empty() || domain_input.is_empty() {
            return Err(AppError::InsufficientInput(
                "first_name, last_name and domain are required".to_string(),
            ));
        }
        if !validate_name_format(first_name) || !validate_name_format(last_name) {
            return Err(AppError::InvalidInput(
                "Names may only contain letters, spaces, apostrophes, periods and hyphens".to_string(),
            ));
        }
        let original_domain = get_domain_from_url(domain_input)?;

        let first_clean = extract_letters_only(first_name);
        let last_clean = extract_letters_only(last_name);
        if first_clean.is_empty() || last_clean.is_empty() {
            return Err(AppError::InvalidInput(
                "Names must contain at least one letter".to_string(),
            ));
        }

        let task_label = format!("{} {}@{}", first_clean, last_clean, original_domain);
        tracing::info!(target: "smtp_task", "[{}] Starting email discovery", task_label);
        let start_time = Instant::now();

        let resolution = resolve_with_fallback(self.resolver.as_ref(), self.domains.as_ref(), &original_domain).await;

        let mut report = EmailReport {
            first_name: first_clean.clone(),
            last_name: last_clean.clone(),
            original_first_name: first_name.to_string(),
            original_last_name: last_name.to_string(),
            domain: resolution.effective_domain().to_string(),
            original_domain: original_domain.clone(),
            mx_hosts_found: resolution.records.hosts.len(),
            alternatives_tried: resolution.alternatives_tried.clone(),
            ..EmailReport::default()
        };

        if resolution.records.is_empty() {
            tracing::warn!(target: "smtp_task", "[{}] No MX records for domain or alternates", task_label);
            report.message = Some(no_mx_message(&original_domain, &resolution.alternatives_tried));
            return Ok(report);
        }
        if resolution.used_alternate() {
            report.message = Some(format!(
                "Used alternative domain {} (no MX records for {})",
                report.domain, original_domain
            ));
        }

        let candidates = generate_email_patterns(&first_clean, &last_clean, resolution.effective_domain());
        report.total_patterns_tested = candidates.len();
        let hosts = &resolution.records.hosts;

        let mut outcomes = Vec::with_capacity(candidates.len());
        for (index, candidate) in candidates.iter().enumerate() {
            if index > 0 {
                sleep(get_random_sleep_duration(&self.config)).await;
            }
            let email = candidate.address();
            let accepted = self.probe.probe(&email, hosts).await;
            tracing::debug!(target: "smtp_task", "[{}] {} -> {}", task_label, email,
                if accepted { "accepted" } else { "not accepted" });
            outcomes.push(ValidationOutcome { email, accepted });
        }

        report.valid_emails = outcomes
            .into_iter()
            .filter(|o| o.accepted)
            .map(|o| o.email)
            .collect();

        tracing::info!(target: "smtp_task", "[{}] Email discovery finished in {:.2?}: {} of {} accepted",
            task_label, start_time.elapsed(), report.valid_emails.len(), report.total_patterns_tested);
        Ok(report)
    }

    /// Searches pages about the person for phone numbers.
    ///
    /// Region A (`+91`) numbers are listed before global ones. Never invents numbers.
    pub async fn find_phones(&self, first_name: &str, last_name: &str, company: &str) -> Result<PhoneReport> {
        let (first_name, last_name, company) = (first_name.trim(), last_name.trim(), company.trim());
        if first_name.is_empty() || last_name.is_empty() || company.is_empty() {
            return Err(AppError::InsufficientInput(
                "first_name, last_name and company are required".to_string(),
            ));
        }
        let gateway = self.gateway()?;

        let company_domain = self.domains.primary_domain(company);
        let hint = self
            .parser
            .parse(company)
            .qualifier
            .as_deref()
            .and_then(CountryHint::from_qualifier)
            .or_else(|| CountryHint::from_domain(&company_domain));
        let strategies = self.strategies.phone_strategies(first_name, last_name, company, &company_domain);
        let policy = PhoneStopPolicy::from_config(&self.config);
        let task_label = format!("{} {} / {}", first_name, last_name, company);

        let mut collector = PhoneCollector::with_hint(hint);
        let mut executed = 0;

        for strategy in &strategies {
            if executed > 0 {
                sleep(get_random_sleep_duration(&self.config)).await;
            }
            executed += 1;
            tracing::info!(target: "phone_task", "[{}] Phone search ({}/{}): {}", task_label, executed, strategies.len(), strategy.query);

            let request = SearchRequest::new(strategy, 10, ResultFilter::Unfiltered);
            match gateway.execute(&request).await {
                Ok(items) => {
                    for item in &items {
                        collector.add_from_text(&format!("{} {}", item.title, item.snippet), &task_label);
                        if is_high_value(item) {
                            if let Some(page) = self.fetcher.fetch_text(&item.url).await {
                                collector.add_from_text(&page, &task_label);
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(target: "phone_task", "[{}] Phone search failed for '{}': {}", task_label, strategy.query, e);
                }
            }

            if policy.should_stop(collector.regional.len(), collector.global.len(), executed) {
                tracing::info!(target: "phone_task", "[{}] Found sufficient numbers, stopping after {} strategies", task_label, executed);
                break;
            }
        }

        let mut phone_numbers: Vec<String> = collector
            .regional
            .iter()
            .chain(collector.global.iter())
            .cloned()
            .collect();
        phone_numbers.truncate(self.config.phone_max_results);

        tracing::info!(target: "phone_task", "[{}] Total numbers found: {} ({} regional, {} global)",
            task_label, phone_numbers.len(), collector.regional.len(), collector.global.len());

        Ok(PhoneReport {
            phone_numbers,
            indian_phone_numbers: collector.regional,
            global_phone_numbers: collector.global,
            search_queries_used: executed,
        })
    }

    /// Email guessing and phone search run concurrently.
    ///
    /// The company defaults to the domain's name. A phone search failure
    /// leaves the phone lists empty; an email failure fails the whole call.
    pub async fn find_contact(
        &self,
        first_name: &str,
        last_name: &str,
        domain: &str,
        company: Option<&str>,
    ) -> Result<ContactReport> {
        let company = company
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .or_else(|| {
                get_domain_from_url(domain)
                    .ok()
                    .map(|d| title_case(d.split('.').next().unwrap_or_default()))
            });

        let phone_search = async {
            match company.as_deref() {
                Some(company) => self.find_phones(first_name, last_name, company).await,
                None => Ok(PhoneReport::default()),
            }
        };
        let (email, phones) = tokio::join!(self.guess_emails(first_name, last_name, domain), phone_search);

        let email = email?;
        let phones = phones.unwrap_or_else(|e| {
            tracing::warn!(target: "phone_task", "Phone search for {} {} skipped: {}", first_name, last_name, e);
            PhoneReport::default()
        });

        Ok(ContactReport { email, company, phones })
    }

    /// Recruiters at companies that suit `subject`, scored and sorted best first.
    pub async fn recommend_recruiters(
        &self,
        subject: &SubjectProfile,
        location: Option<&str>,
        max_results: Option<usize>,
    ) -> Result<Vec<MatchResult>> {
        self.gateway()?;
        let limit = max_results.unwrap_or(self.config.max_recommendations).max(1);
        let companies = target_companies(subject, self.config.max_target_companies);
        tracing::info!(target: "search_task", "Target companies for profile: {:?}", companies);

        let location = location.map(str::trim).filter(|l| !l.is_empty());
        let mut matches: Vec<MatchResult> = Vec::new();
        for company in &companies {
            let query = match location {
                Some(loc) => format!("{} {}", company, loc),
                None => company.clone(),
            };
            let outcome = match self.search_recruiters(&query, self.config.default_recruiter_results).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(target: "search_task", "Failed to search recruiters for {}: {}", company, e);
                    continue;
                }
            };
            for ranked in outcome.results {
                let mut result = self.matcher.score(ranked.item, subject);
                result.target_company = Some(company.clone());
                matches.push(result);
            }
        }

        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches.truncate(limit);
        Ok(matches)
    }
}

fn validate_company(raw: &str) -> Result<&str> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < MIN_COMPANY_CHARS {
        return Err(AppError::InvalidInput(
            "Company name must be at least 2 characters long".to_string(),
        ));
    }
    Ok(trimmed)
}

/// A query that was only a location leaves nothing to search for.
fn validate_entity(target: &ParsedTarget) -> Result<()> {
    if target.entity.chars().count() < MIN_COMPANY_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Please include a company name along with the location '{}'",
            target.qualifier.as_deref().unwrap_or_default()
        )));
    }
    Ok(())
}

fn title_mentions_recruiting(title: &str) -> bool {
    let lower = title.to_lowercase();
    BROAD_TITLE_WORDS.iter().any(|word| {
        if *word == "hr" {
            lower.split(|c: char| !c.is_alphanumeric()).any(|w| w == "hr")
        } else {
            lower.contains(word)
        }
    })
}

fn is_high_value(item: &SearchResultItem) -> bool {
    let title = item.title.to_lowercase();
    HIGH_VALUE_SOURCES.iter().any(|source| item.url.contains(source))
        || CONTACT_TITLE_WORDS.iter().any(|word| title.contains(word))
}

/// Distinct valid numbers split by region, in discovery order.
#[derive(Default)]
struct PhoneCollector {
    hint: Option<CountryHint>,
    regional: Vec<String>,
    global: Vec<String>,
}

impl PhoneCollector {
    fn with_hint(hint: Option<CountryHint>) -> Self {
        Self {
            hint,
            ..Self::default()
        }
    }

    fn add_from_text(&mut self, text: &str, task_label: &str) {
        for candidate in extract_phone_numbers(text, self.hint) {
            self.add(candidate, task_label);
        }
    }

    fn add(&mut self, candidate: PhoneCandidate, task_label: &str) {
        let Some(number) = candidate.normalized else {
            return;
        };
        let list = match candidate.region {
            PhoneRegion::Indian => &mut self.regional,
            PhoneRegion::Global => &mut self.global,
        };
        if !list.contains(&number) {
            tracing::info!(target: "phone_task", "[{}] Found {:?} number: {}", task_label, candidate.region, number);
            list.push(number);
        }
    }
}
