use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// A GitHub user profile from the `/users/{username}` API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub blog: Option<String>,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
}

impl Profile {
    /// The name to show in the card header, falling back to the login.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.login)
    }

    /// Blog link with a scheme, suitable for handing to the browser.
    /// GitHub stores whatever the user typed, often a bare host.
    pub fn blog_url(&self) -> Option<String> {
        let blog = self.blog.as_deref()?.trim();
        if blog.is_empty() {
            return None;
        }
        if blog.starts_with("http://") || blog.starts_with("https://") {
            Some(blog.to_string())
        } else {
            Some(format!("https://{blog}"))
        }
    }

    pub fn joined(&self) -> String {
        self.created_at.format("Joined %b %Y").to_string()
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
