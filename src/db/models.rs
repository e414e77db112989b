//! Database Models - structs representing stored documents (used by sqlx/serde).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Fixed key of the one site-config row.
pub const SITE_CONFIG_KEY: &str = "site";

/// Site configuration document: every editable text block on the page,
/// stored wholesale as one JSONB value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    pub hero: HeroSection,
    pub about: AboutSection,
    pub projects_section: ProjectsSection,
    pub contact: ContactSection,
    pub seo: SeoSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeroSection {
    pub title: String,
    pub subtitle: String,
    pub cta_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AboutSection {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsSection {
    pub title: String,
    pub subtitle: String,
    pub github_button_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactSection {
    pub title: String,
    pub subtitle: String,
    pub form_title: String,
    pub email_placeholder: String,
    pub message_placeholder: String,
    pub button_text: String,
    pub info_email: String,
    pub info_phone: String,
    pub info_address: String,
    pub footer_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeoSection {
    pub title: String,
    pub description: String,
    pub keywords: String,
}

impl Default for SiteContent {
    /// The document created lazily on the first public read.
    fn default() -> Self {
        Self {
            hero: HeroSection {
                title: "Building for the open web".to_string(),
                subtitle: "I design and build digital experiences where engineering \
                           meets craft."
                    .to_string(),
                cta_text: "See my work".to_string(),
            },
            about: AboutSection {
                title: "Developer, designer, explorer.".to_string(),
                description: "Writing code, to me, is the craft of catching ideas \
                              mid-flight and turning them into something real."
                    .to_string(),
            },
            projects_section: ProjectsSection {
                title: "Selected Projects".to_string(),
                subtitle: "Code that outlasts its commit date.".to_string(),
                github_button_text: "More on GitHub".to_string(),
            },
            contact: ContactSection {
                title: "Get in touch".to_string(),
                subtitle: "One message away.".to_string(),
                form_title: "Send a message".to_string(),
                email_placeholder: "Your email address".to_string(),
                message_placeholder: "Tell me about your project...".to_string(),
                button_text: "Send".to_string(),
                info_email: "hello@example.com".to_string(),
                info_phone: "+1 555 000 0000".to_string(),
                info_address: "Remote".to_string(),
                footer_text: "© 2024. All rights reserved.".to_string(),
            },
            seo: SeoSection {
                title: "Portfolio | Design & Code".to_string(),
                description: "Personal portfolio built with modern web technologies."
                    .to_string(),
                keywords: "developer, portfolio, web design".to_string(),
            },
        }
    }
}

/// Project model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub link: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

/// Contact message model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub is_read: bool,
    pub ip: Option<String>,
    pub visitor_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One calendar day of visit counters
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAnalytics {
    pub date: NaiveDate,
    pub page_views: i64,
    pub project_clicks: i64,
    pub unique_visitors: i64,
}
