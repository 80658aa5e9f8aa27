//! Provider payloads and their normalization into a [`CanonicalProfile`].
//!
//! Everything downstream of [`RawProfile::normalize`] is provider-agnostic:
//! reconciliation and account creation only ever see canonical fields.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::provider::Provider;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalProfile {
    pub external_id: String,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub avatar_source_url: String,
}

/// OpenID Connect userinfo document returned by Google.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

/// Graph API `me` node with `picture.type(large)` expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacebookProfile {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<FacebookPicture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacebookPicture {
    pub data: FacebookPictureData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacebookPictureData {
    pub url: Option<String>,
    #[serde(default)]
    pub is_silhouette: bool,
}

#[derive(Debug, Clone)]
pub enum RawProfile {
    Google(GoogleProfile),
    Facebook(FacebookProfile),
}

pub trait ProfileNormalizer {
    fn normalize(self) -> DomainResult<CanonicalProfile>;
}

impl RawProfile {
    #[must_use]
    pub fn provider(&self) -> Provider {
        match self {
            RawProfile::Google(_) => Provider::Google,
            RawProfile::Facebook(_) => Provider::Facebook,
        }
    }

    /// Normalizes a payload fetched for `expected`, rejecting payloads of
    /// another provider.
    pub fn normalize(self, expected: Provider) -> DomainResult<CanonicalProfile> {
        let actual = self.provider();
        if actual != expected {
            return Err(DomainError::ProviderMismatch { expected, actual });
        }

        match self {
            RawProfile::Google(profile) => profile.normalize(),
            RawProfile::Facebook(profile) => profile.normalize(),
        }
    }
}

impl ProfileNormalizer for GoogleProfile {
    fn normalize(self) -> DomainResult<CanonicalProfile> {
        const PROVIDER: Provider = Provider::Google;

        if self.email_verified == Some(false) {
            return Err(DomainError::UnverifiedEmail { provider: PROVIDER });
        }

        let (given_name, family_name) = resolve_names(
            PROVIDER,
            self.given_name.as_deref(),
            self.family_name.as_deref(),
            self.name.as_deref(),
        )?;

        Ok(CanonicalProfile {
            external_id: required(PROVIDER, "sub", Some(self.sub.as_str()))?,
            email: required(PROVIDER, "email", self.email.as_deref())?,
            given_name,
            family_name,
            avatar_source_url: required(PROVIDER, "picture", self.picture.as_deref())?,
        })
    }
}

impl ProfileNormalizer for FacebookProfile {
    fn normalize(self) -> DomainResult<CanonicalProfile> {
        const PROVIDER: Provider = Provider::Facebook;

        let (given_name, family_name) = resolve_names(
            PROVIDER,
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            self.name.as_deref(),
        )?;

        let picture_url = self
            .picture
            .as_ref()
            .and_then(|picture| picture.data.url.as_deref());

        Ok(CanonicalProfile {
            external_id: required(PROVIDER, "id", Some(self.id.as_str()))?,
            email: required(PROVIDER, "email", self.email.as_deref())?,
            given_name,
            family_name,
            avatar_source_url: required(PROVIDER, "picture.data.url", picture_url)?,
        })
    }
}

fn required(provider: Provider, field: &'static str, value: Option<&str>) -> DomainResult<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .ok_or(DomainError::MalformedProfile { provider, field })
}

// Explicit name parts win; otherwise the display name is split into a
// first token and the remainder.
fn resolve_names(
    provider: Provider,
    given: Option<&str>,
    family: Option<&str>,
    display: Option<&str>,
) -> DomainResult<(String, String)> {
    let (display_given, display_family) = display
        .map(str::trim)
        .and_then(|name| {
            name.split_once(char::is_whitespace)
                .map(|(first, rest)| (Some(first), Some(rest.trim())))
                .or(Some((Some(name), None)))
        })
        .unwrap_or((None, None));

    let given_name = required(
        provider,
        "given_name",
        given.filter(|g| !g.trim().is_empty()).or(display_given),
    )?;
    let family_name = required(
        provider,
        "family_name",
        family.filter(|f| !f.trim().is_empty()).or(display_family),
    )?;

    Ok((given_name, family_name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn google() -> GoogleProfile {
        GoogleProfile {
            sub: "g2".to_string(),
            email: Some("new@x.com".to_string()),
            email_verified: Some(true),
            name: Some("A B".to_string()),
            given_name: Some("A".to_string()),
            family_name: Some("B".to_string()),
            picture: Some("http://img".to_string()),
        }
    }

    fn facebook_json() -> &'static str {
        r#"{
            "id": "10228371",
            "email": " jane@example.com ",
            "first_name": "Jane",
            "last_name": "Doe",
            "name": "Jane Doe",
            "picture": {
                "data": {
                    "height": 200,
                    "is_silhouette": false,
                    "url": "https://platform-lookaside.fbsbx.com/platform/profilepic/?asid=10228371",
                    "width": 200
                }
            }
        }"#
    }

    #[test]
    fn google_profile_maps_to_canonical_fields() {
        let profile = RawProfile::Google(google())
            .normalize(Provider::Google)
            .unwrap();

        assert_eq!(
            profile,
            CanonicalProfile {
                external_id: "g2".to_string(),
                email: "new@x.com".to_string(),
                given_name: "A".to_string(),
                family_name: "B".to_string(),
                avatar_source_url: "http://img".to_string(),
            }
        );
    }

    #[test]
    fn facebook_nested_picture_is_flattened() {
        let raw: FacebookProfile = serde_json::from_str(facebook_json()).unwrap();
        let profile = RawProfile::Facebook(raw)
            .normalize(Provider::Facebook)
            .unwrap();

        assert_eq!(profile.external_id, "10228371");
        assert_eq!(profile.email, "jane@example.com");
        assert_eq!(profile.given_name, "Jane");
        assert_eq!(profile.family_name, "Doe");
        assert!(profile.avatar_source_url.ends_with("asid=10228371"));
    }

    #[test]
    fn missing_email_is_malformed() {
        let mut raw = google();
        raw.email = Some("   ".to_string());

        assert_eq!(
            raw.normalize(),
            Err(DomainError::MalformedProfile {
                provider: Provider::Google,
                field: "email",
            })
        );
    }

    #[test]
    fn unverified_google_email_is_rejected() {
        let mut raw = google();
        raw.email_verified = Some(false);

        assert_eq!(
            raw.normalize(),
            Err(DomainError::UnverifiedEmail {
                provider: Provider::Google
            })
        );
    }

    #[test]
    fn names_fall_back_to_display_name() {
        let mut raw = google();
        raw.given_name = None;
        raw.family_name = None;
        raw.name = Some("Ada King Lovelace".to_string());

        let profile = raw.normalize().unwrap();
        assert_eq!(profile.given_name, "Ada");
        assert_eq!(profile.family_name, "King Lovelace");
    }

    #[test]
    fn single_token_display_name_lacks_family_name() {
        let mut raw = google();
        raw.family_name = None;
        raw.name = Some("Cher".to_string());

        assert_eq!(
            raw.normalize(),
            Err(DomainError::MalformedProfile {
                provider: Provider::Google,
                field: "family_name",
            })
        );
    }

    #[test]
    fn facebook_without_picture_is_malformed() {
        let mut raw: FacebookProfile = serde_json::from_str(facebook_json()).unwrap();
        raw.picture = None;

        assert_eq!(
            raw.normalize(),
            Err(DomainError::MalformedProfile {
                provider: Provider::Facebook,
                field: "picture.data.url",
            })
        );
    }

    #[test]
    fn payload_for_another_provider_is_rejected() {
        assert_eq!(
            RawProfile::Google(google()).normalize(Provider::Facebook),
            Err(DomainError::ProviderMismatch {
                expected: Provider::Facebook,
                actual: Provider::Google,
            })
        );
    }
}
