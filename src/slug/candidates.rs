use crate::config::SearchConfig;
use crate::slug::SearchQuery;
use chrono::Datelike;

/// Days tried for every month; impossible dates simply never resolve
pub const DAYS_PER_MONTH: u32 = 31;

/// Which suffix variants are tried for each day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugScheme {
    /// Highest page index; indexes start at 2 because the first page has none
    pub max_index: u32,

    /// Two-digit years inserted before the index; empty disables year variants
    pub years: Vec<u8>,
}

impl SlugScheme {
    /// Builds the scheme from search settings
    ///
    /// With year qualification on and no explicit years, the current year is used.
    pub fn from_config(config: &SearchConfig) -> Self {
        let years = if !config.include_year {
            Vec::new()
        } else if config.years.is_empty() {
            vec![two_digit_year(chrono::Local::now().year())]
        } else {
            let mut years: Vec<u8> = config.years.iter().map(|y| two_digit_year(*y)).collect();
            years.sort_unstable();
            years.dedup();
            years
        };

        Self {
            max_index: config.max_index,
            years,
        }
    }

    /// Number of candidates produced for a single day
    pub fn per_day(&self) -> usize {
        self.max_index.max(1) as usize * (1 + self.years.len())
    }
}

fn two_digit_year(year: i32) -> u8 {
    year.rem_euclid(100) as u8
}

/// Builds one candidate URL: `{base}/{slug}-{MM}-{DD}[-{YY}][-{index}]`
pub fn format_candidate(
    base_url: &str,
    slug: &str,
    month: u32,
    day: u32,
    year: Option<u8>,
    index: Option<u32>,
) -> String {
    let mut url = format!("{}/{}-{:02}-{:02}", base_url, slug, month, day);
    if let Some(year) = year {
        url.push_str(&format!("-{:02}", year));
    }
    if let Some(index) = index {
        url.push_str(&format!("-{}", index));
    }
    url
}

/// Candidates for one day, in priority order
///
/// The bare date slug comes first, then indexes `2..=max_index`; every year
/// variant repeats the same sequence with the year inserted.
pub fn day_candidates<'a>(
    base_url: &'a str,
    slug: &'a str,
    month: u32,
    day: u32,
    scheme: &'a SlugScheme,
) -> impl Iterator<Item = String> + 'a {
    let years = std::iter::once(None).chain(scheme.years.iter().copied().map(Some));

    years.flat_map(move |year| {
        std::iter::once(None)
            .chain((2..=scheme.max_index).map(Some))
            .map(move |index| format_candidate(base_url, slug, month, day, year, index))
    })
}

/// The full set of candidates for a search
///
/// The plan is cheap to hold and can be iterated any number of times; each
/// call to [`CandidatePlan::iter`] starts a fresh lazy walk over
/// slug × month × day × variant.
#[derive(Debug, Clone)]
pub struct CandidatePlan {
    base_url: String,
    slugs: Vec<String>,
    months: Vec<u32>,
    scheme: SlugScheme,
}

impl CandidatePlan {
    pub fn new(base_url: &str, slugs: Vec<String>, months: Vec<u32>, scheme: SlugScheme) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            slugs,
            months,
            scheme,
        }
    }

    /// Builds the plan for a query under the given search settings
    pub fn from_config(query: &SearchQuery, config: &SearchConfig) -> Self {
        Self::new(
            &config.base_url,
            query.variants(),
            config.effective_months(),
            SlugScheme::from_config(config),
        )
    }

    pub fn slugs(&self) -> &[String] {
        &self.slugs
    }

    pub fn months(&self) -> &[u32] {
        &self.months
    }

    pub fn scheme(&self) -> &SlugScheme {
        &self.scheme
    }

    /// Exact number of candidates, computed without enumerating them
    pub fn len(&self) -> usize {
        self.slugs.len() * self.months.len() * DAYS_PER_MONTH as usize * self.scheme.per_day()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazily walks every candidate URL
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        self.slugs.iter().flat_map(move |slug| {
            self.months.iter().flat_map(move |&month| {
                (1..=DAYS_PER_MONTH).flat_map(move |day| {
                    day_candidates(&self.base_url, slug, month, day, &self.scheme)
                })
            })
        })
    }
}
