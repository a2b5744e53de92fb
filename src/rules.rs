//! Extraction rules: every keyword set, pattern library and threshold the
//! classifier and extractors use, in one versioned value.
//!
//! `ExtractionRules::default()` is the built-in library. A TOML file can override any
//! top-level key; a `[service]` or `[product]` table replaces that kind's rules whole.

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::model::OfferingKind;

pub const RULES_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionRules {
    pub version: u32,
    /// Shortest accepted list item, in characters.
    pub min_item_chars: usize,
    /// Longest accepted list item, in characters.
    pub max_item_chars: usize,
    pub service: OfferingRules,
    pub product: OfferingRules,
    pub pricing_pattern: String,
    pub email_pattern: String,
    pub phone_pattern: String,
    /// Stripped from the seed page title to get the company name.
    pub company_suffix_pattern: String,
    pub seed_mentioned_services: bool,
    pub mentioned_service_keywords: Vec<String>,
    pub technology_keywords: Vec<String>,
    pub industry_keywords: Vec<String>,
    pub geo_markers: Vec<GeoMarker>,
    pub general_feature_patterns: Vec<String>,
    pub general_benefit_patterns: Vec<String>,
    pub general_use_case_patterns: Vec<String>,
    pub integration_patterns: Vec<String>,
    pub certification_patterns: Vec<String>,
    pub general_list_cap: usize,
    pub integration_cap: usize,
}

/// Rules for one offering kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferingRules {
    /// Substrings of the lowercased URL or title that mark a page as this kind.
    pub page_keywords: Vec<String>,
    /// Category tokens in priority order; the token is both keyword and category.
    pub categories: Vec<String>,
    pub description_patterns: Vec<String>,
    pub description_fallback_chars: usize,
    pub list_cap: usize,
    pub feature_patterns: Vec<String>,
    pub benefit_patterns: Vec<String>,
    pub use_case_patterns: Vec<String>,
    #[serde(default)]
    pub target_audience_patterns: Vec<String>,
    #[serde(default)]
    pub requirements_patterns: Vec<String>,
    #[serde(default)]
    pub deployment_patterns: Vec<String>,
    #[serde(default)]
    pub support_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoMarker {
    pub path: String,
    pub region: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const BULLET_PATTERNS: &[&str] = &[
    r"(?m)^[ \t]*•\s*([^•\n]+)",
    r"(?m)^[ \t]*-\s*([^\n]+)",
    r"(?m)^[ \t]*\*\s*([^*\n]+)",
    r"(?m)^[ \t]*✓\s*([^✓\n]+)",
];

const BENEFIT_PATTERNS: &[&str] = &[
    r"(?i)Benefits?:\s*([^.\n]+)",
    r"(?i)Advantages?:\s*([^.\n]+)",
    r"(?i)Why choose[^?]*\?[^.]*\.([^.\n]+)",
    r"(?i)Improves?\s+([^.\n]+)",
    r"(?i)Reduces?\s+([^.\n]+)",
    r"(?i)Increases?\s+([^.\n]+)",
];

const USE_CASE_PATTERNS: &[&str] = &[
    r"(?i)Use cases?:\s*([^.\n]+)",
    r"(?i)Perfect for:\s*([^.\n]+)",
    r"(?i)Ideal for:\s*([^.\n]+)",
    r"(?i)Best suited for:\s*([^.\n]+)",
    r"(?i)Designed for:\s*([^.\n]+)",
];

impl OfferingRules {
    pub fn service() -> Self {
        let mut features = strings(BULLET_PATTERNS);
        features.extend(strings(&[
            r"(?i)Features?:\s*([^.\n]+)",
            r"(?i)Includes?:\s*([^.\n]+)",
        ]));
        OfferingRules {
            page_keywords: strings(&[
                "/services/",
                "/service/",
                "/solutions/",
                "service",
                "solutions",
                "consulting",
                "support",
                "training",
                "implementation",
                "migration",
                "optimization",
                "maintenance",
            ]),
            categories: strings(&[
                "consulting",
                "training",
                "support",
                "implementation",
                "security",
                "cloud",
            ]),
            description_patterns: strings(&[r"([^.]{50,200}\.)", r"([A-Z][^.]{30,150}\.)"]),
            description_fallback_chars: 200,
            list_cap: 10,
            feature_patterns: features,
            benefit_patterns: strings(BENEFIT_PATTERNS),
            use_case_patterns: strings(USE_CASE_PATTERNS),
            target_audience_patterns: Vec::new(),
            requirements_patterns: Vec::new(),
            deployment_patterns: Vec::new(),
            support_patterns: Vec::new(),
        }
    }

    pub fn product() -> Self {
        let mut features = strings(BULLET_PATTERNS);
        features.extend(strings(&[
            r"(?i)Features?:\s*([^.\n]+)",
            r"(?i)Includes?:\s*([^.\n]+)",
            r"(?i)Capabilities?:\s*([^.\n]+)",
        ]));
        let mut benefits = strings(BENEFIT_PATTERNS);
        benefits.push(r"(?i)Delivers?\s+([^.\n]+)".to_string());
        let mut use_cases = strings(USE_CASE_PATTERNS);
        use_cases.push(r"(?i)Target audience:\s*([^.\n]+)".to_string());

        OfferingRules {
            page_keywords: strings(&[
                "/product/",
                "/products/",
                "/tuote/",
                "/solutions/",
                "product",
                "solution",
                "platform",
                "software",
                "tool",
                "course",
                "kurssi",
                "bundle",
                "package",
            ]),
            categories: strings(&["security", "cloud", "software", "platform", "course", "tool"]),
            description_patterns: strings(&[r"([^.]{50,300}\.)", r"([A-Z][^.]{30,200}\.)"]),
            description_fallback_chars: 300,
            list_cap: 15,
            feature_patterns: features,
            benefit_patterns: benefits,
            use_case_patterns: use_cases,
            target_audience_patterns: strings(&[
                r"(?i)Target audience:\s*([^.\n]+)",
                r"(?i)Perfect for:\s*([^.\n]+)",
                r"(?i)Ideal for:\s*([^.\n]+)",
                r"(?i)Designed for:\s*([^.\n]+)",
                r"(?i)Best suited for:\s*([^.\n]+)",
            ]),
            requirements_patterns: strings(&[
                r"(?i)Requirements?:\s*([^.\n]+)",
                r"(?i)System requirements?:\s*([^.\n]+)",
                r"(?i)Prerequisites?:\s*([^.\n]+)",
                r"(?i)Minimum requirements?:\s*([^.\n]+)",
            ]),
            deployment_patterns: strings(&[
                r"(?i)Deployment:\s*([^.\n]+)",
                r"(?i)Installation:\s*([^.\n]+)",
                r"(?i)Setup:\s*([^.\n]+)",
                r"(?i)Implementation:\s*([^.\n]+)",
            ]),
            support_patterns: strings(&[
                r"(?i)Support:\s*([^.\n]+)",
                r"(?i)Customer support:\s*([^.\n]+)",
                r"(?i)Technical support:\s*([^.\n]+)",
                r"(?i)Help desk:\s*([^.\n]+)",
            ]),
        }
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        ExtractionRules {
            version: RULES_VERSION,
            min_item_chars: 11,
            max_item_chars: 199,
            service: OfferingRules::service(),
            product: OfferingRules::product(),
            pricing_pattern: r"(?i)[$€£¥]\s*[\d,]+(?:\.\d{2})?(?:\s*(?:per|/)\s*(?:month|year|hour|day|user|seat))?".to_string(),
            email_pattern: r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b".to_string(),
            phone_pattern: r"(\+?1[-.\s]?)?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})".to_string(),
            company_suffix_pattern: r"(?i)\s*-\s*(Home|About|Services|Contact).*$".to_string(),
            seed_mentioned_services: true,
            mentioned_service_keywords: strings(&[
                "consulting",
                "development",
                "design",
                "marketing",
                "analytics",
                "cloud",
                "hosting",
                "support",
                "maintenance",
                "integration",
                "custom software",
                "web development",
                "mobile app",
                "e-commerce",
                "data analytics",
                "business intelligence",
                "automation",
                "AI",
                "machine learning",
                "cybersecurity",
                "devops",
                "infrastructure",
                "training",
                "implementation",
                "migration",
                "optimization",
            ]),
            technology_keywords: strings(&[
                "python",
                "javascript",
                "react",
                "vue",
                "angular",
                "node.js",
                "java",
                "c#",
                "php",
                "ruby",
                "go",
                "rust",
                "swift",
                "kotlin",
                "aws",
                "azure",
                "gcp",
                "docker",
                "kubernetes",
                "terraform",
                "mysql",
                "postgresql",
                "mongodb",
                "redis",
                "elasticsearch",
                "apache",
                "nginx",
                "linux",
                "windows",
                "macos",
            ]),
            industry_keywords: strings(&[
                "healthcare",
                "financial",
                "government",
                "legal",
                "manufacturing",
                "education",
                "retail",
                "technology",
                "energy",
                "automotive",
                "real estate",
                "insurance",
                "banking",
                "telecommunications",
            ]),
            geo_markers: [
                ("/fi/", "Finland"),
                ("/de/", "Germany"),
                ("/fr/", "France"),
                ("/es/", "Spain"),
                ("/ja/", "Japan"),
            ]
            .iter()
            .map(|(path, region)| GeoMarker {
                path: path.to_string(),
                region: region.to_string(),
            })
            .collect(),
            general_feature_patterns: strings(BULLET_PATTERNS),
            general_benefit_patterns: strings(&[
                r"(?i)Benefits?:\s*([^.\n]+)",
                r"(?i)Advantages?:\s*([^.\n]+)",
                r"(?i)Improves?\s+([^.\n]+)",
                r"(?i)Reduces?\s+([^.\n]+)",
                r"(?i)Increases?\s+([^.\n]+)",
            ]),
            general_use_case_patterns: strings(&[
                r"(?i)Use cases?:\s*([^.\n]+)",
                r"(?i)Perfect for:\s*([^.\n]+)",
                r"(?i)Ideal for:\s*([^.\n]+)",
                r"(?i)Best suited for:\s*([^.\n]+)",
            ]),
            integration_patterns: strings(&[
                r"(?i)Integrates? with:\s*([^.\n]+)",
                r"(?i)Compatible with:\s*([^.\n]+)",
                r"(?i)Works with:\s*([^.\n]+)",
                r"(?i)Supports?:\s*([^.\n]+)",
            ]),
            certification_patterns: strings(&[
                r"(?i)Certified:\s*([^.\n]+)",
                r"(?i)Certification:\s*([^.\n]+)",
                r"(?i)Compliant with:\s*([^.\n]+)",
                r"(?i)Meets? standards?:\s*([^.\n]+)",
            ]),
            general_list_cap: 20,
            integration_cap: 15,
        }
    }
}

impl ExtractionRules {
    /// Load rules from a TOML/JSON/YAML file; keys absent from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let rules = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize::<ExtractionRules>()?;
        Ok(rules)
    }

    pub fn compile(&self) -> Result<CompiledRules, ConfigError> {
        Ok(CompiledRules {
            version: self.version,
            min_item_chars: self.min_item_chars,
            max_item_chars: self.max_item_chars,
            service: CompiledOfferingRules::compile(OfferingKind::Service, &self.service)?,
            product: CompiledOfferingRules::compile(OfferingKind::Product, &self.product)?,
            pricing: compile_one("pricing_pattern", &self.pricing_pattern)?,
            email: compile_one("email_pattern", &self.email_pattern)?,
            phone: compile_one("phone_pattern", &self.phone_pattern)?,
            company_suffix: compile_one("company_suffix_pattern", &self.company_suffix_pattern)?,
            seed_mentioned_services: self.seed_mentioned_services,
            mentioned_service_keywords: self.mentioned_service_keywords.clone(),
            technology_keywords: self.technology_keywords.clone(),
            industry_keywords: self.industry_keywords.clone(),
            geo_markers: self.geo_markers.clone(),
            general_features: compile_list("general_feature_patterns", &self.general_feature_patterns)?,
            general_benefits: compile_list("general_benefit_patterns", &self.general_benefit_patterns)?,
            general_use_cases: compile_list("general_use_case_patterns", &self.general_use_case_patterns)?,
            integrations: compile_list("integration_patterns", &self.integration_patterns)?,
            certifications: compile_list("certification_patterns", &self.certification_patterns)?,
            general_list_cap: self.general_list_cap,
            integration_cap: self.integration_cap,
        })
    }
}

/// Rules with every pattern compiled, ready for the extractors.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub version: u32,
    pub min_item_chars: usize,
    pub max_item_chars: usize,
    pub service: CompiledOfferingRules,
    pub product: CompiledOfferingRules,
    pub pricing: Regex,
    pub email: Regex,
    pub phone: Regex,
    pub company_suffix: Regex,
    pub seed_mentioned_services: bool,
    pub mentioned_service_keywords: Vec<String>,
    pub technology_keywords: Vec<String>,
    pub industry_keywords: Vec<String>,
    pub geo_markers: Vec<GeoMarker>,
    pub general_features: Vec<Regex>,
    pub general_benefits: Vec<Regex>,
    pub general_use_cases: Vec<Regex>,
    pub integrations: Vec<Regex>,
    pub certifications: Vec<Regex>,
    pub general_list_cap: usize,
    pub integration_cap: usize,
}

impl CompiledRules {
    pub fn for_kind(&self, kind: OfferingKind) -> &CompiledOfferingRules {
        match kind {
            OfferingKind::Service => &self.service,
            OfferingKind::Product => &self.product,
        }
    }

    /// Length filter shared by every list extractor.
    pub fn accepts_item(&self, item: &str) -> bool {
        let n = item.chars().count();
        n >= self.min_item_chars && n <= self.max_item_chars
    }
}

impl Default for CompiledRules {
    fn default() -> Self {
        // The built-in patterns are fixed strings covered by tests.
        ExtractionRules::default()
            .compile()
            .expect("built-in extraction rules must compile")
    }
}

#[derive(Debug, Clone)]
pub struct CompiledOfferingRules {
    pub kind: OfferingKind,
    pub page_keywords: Vec<String>,
    pub categories: Vec<String>,
    pub description: Vec<Regex>,
    pub description_fallback_chars: usize,
    pub list_cap: usize,
    pub features: Vec<Regex>,
    pub benefits: Vec<Regex>,
    pub use_cases: Vec<Regex>,
    pub target_audience: Vec<Regex>,
    pub requirements: Vec<Regex>,
    pub deployment: Vec<Regex>,
    pub support: Vec<Regex>,
}

impl CompiledOfferingRules {
    fn compile(kind: OfferingKind, rules: &OfferingRules) -> Result<Self, ConfigError> {
        let prefix = kind.as_str();
        let name = |field: &str| format!("{}.{}", prefix, field);
        Ok(CompiledOfferingRules {
            kind,
            page_keywords: rules.page_keywords.iter().map(|k| k.to_lowercase()).collect(),
            categories: rules.categories.iter().map(|k| k.to_lowercase()).collect(),
            description: compile_list(&name("description_patterns"), &rules.description_patterns)?,
            description_fallback_chars: rules.description_fallback_chars,
            list_cap: rules.list_cap,
            features: compile_list(&name("feature_patterns"), &rules.feature_patterns)?,
            benefits: compile_list(&name("benefit_patterns"), &rules.benefit_patterns)?,
            use_cases: compile_list(&name("use_case_patterns"), &rules.use_case_patterns)?,
            target_audience: compile_list(
                &name("target_audience_patterns"),
                &rules.target_audience_patterns,
            )?,
            requirements: compile_list(&name("requirements_patterns"), &rules.requirements_patterns)?,
            deployment: compile_list(&name("deployment_patterns"), &rules.deployment_patterns)?,
            support: compile_list(&name("support_patterns"), &rules.support_patterns)?,
        })
    }
}

fn compile_one(pattern_name: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidRegex {
        pattern_name: pattern_name.to_string(),
        pattern: pattern.to_string(),
        error: e.to_string(),
    })
}

fn compile_list(pattern_name: &str, patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .enumerate()
        .map(|(i, p)| compile_one(&format!("{}[{}]", pattern_name, i), p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_compile() {
        let rules = ExtractionRules::default().compile().unwrap();
        assert_eq!(rules.version, RULES_VERSION);
        assert_eq!(rules.service.list_cap, 10);
        assert_eq!(rules.product.list_cap, 15);
        assert!(rules.service.target_audience.is_empty());
        assert!(!rules.product.support.is_empty());
    }

    #[test]
    fn invalid_regex_is_reported_with_its_name() {
        let mut rules = ExtractionRules::default();
        rules.integration_patterns.push("(unclosed".to_string());
        let err = rules.compile().unwrap_err();
        match err {
            ConfigError::InvalidRegex { pattern_name, .. } => {
                assert_eq!(pattern_name, "integration_patterns[4]");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn item_length_bounds() {
        let rules = CompiledRules::default();
        assert!(!rules.accepts_item(&"x".repeat(10)));
        assert!(rules.accepts_item(&"x".repeat(11)));
        assert!(rules.accepts_item(&"x".repeat(199)));
        assert!(!rules.accepts_item(&"x".repeat(200)));
    }

    #[test]
    fn partial_override_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, "version = 7\nintegration_cap = 3\n").unwrap();
        let rules = ExtractionRules::load(&path).unwrap();
        assert_eq!(rules.version, 7);
        assert_eq!(rules.integration_cap, 3);
        assert_eq!(rules.general_list_cap, 20);
        assert_eq!(rules.service.list_cap, 10);
    }
}
