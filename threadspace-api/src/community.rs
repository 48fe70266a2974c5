use std::fmt;

use crate::Error;

pub const DEFAULT_COLOR: &str = "#FF4500";
pub const DEFAULT_ICON: &str = "Users";
pub const DEFAULT_CATEGORY: &str = "General";

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    bolero::generator::TypeGenerator,
    serde::Deserialize,
    serde::Serialize,
)]
pub struct CommunityId(pub u64);

impl fmt::Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Community {
    pub id: CommunityId,
    pub name: String,
    pub description: String,
    pub member_count: u64,
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub category: String,
}

impl Community {
    /// Community names are compared case-insensitively everywhere
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

pub fn validate_community_name(name: &str) -> Result<(), Error> {
    crate::validate_string(name)?;
    let len = name.chars().count();
    if len < crate::MIN_COMMUNITY_NAME_LEN
        || len > crate::MAX_COMMUNITY_NAME_LEN
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(Error::InvalidName {
            name: String::from(name),
        });
    }
    Ok(())
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewCommunity {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewCommunity {
    pub fn validate(&self) -> Result<(), Error> {
        validate_community_name(&self.name)?;
        validate_description(&self.description)?;
        for s in [&self.color, &self.icon, &self.category].into_iter().flatten() {
            crate::validate_string(s)?;
        }
        Ok(())
    }

    /// The creator is the first member. Assumes `validate` succeeded.
    pub fn into_community(self, id: CommunityId) -> Community {
        Community {
            id,
            name: self.name,
            description: String::from(self.description.trim()),
            member_count: 1,
            color: self.color.unwrap_or_else(|| String::from(DEFAULT_COLOR)),
            icon: self.icon.unwrap_or_else(|| String::from(DEFAULT_ICON)),
            category: self
                .category
                .unwrap_or_else(|| String::from(DEFAULT_CATEGORY)),
        }
    }
}

fn validate_description(description: &str) -> Result<(), Error> {
    crate::validate_text("description", description, crate::MAX_CONTENT_LEN)?;
    if description.trim().chars().count() < crate::MIN_COMMUNITY_DESCRIPTION_LEN {
        return Err(Error::FieldTooShort {
            field: String::from("description"),
            min: crate::MIN_COMMUNITY_DESCRIPTION_LEN,
        });
    }
    Ok(())
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommunityEdit {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl CommunityEdit {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(d) = &self.description {
            validate_description(d)?;
        }
        for s in [&self.color, &self.icon, &self.category].into_iter().flatten() {
            crate::validate_string(s)?;
        }
        Ok(())
    }

    pub fn apply_to(self, community: &mut Community) {
        if let Some(d) = self.description {
            community.description = String::from(d.trim());
        }
        if let Some(c) = self.color {
            community.color = c;
        }
        if let Some(i) = self.icon {
            community.icon = i;
        }
        if let Some(c) = self.category {
            community.category = c;
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct MembershipStatus {
    pub joined: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommunityMatch {
    pub community: Community,
    pub snippet: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        for ok in ["abc", "rust_lang", "A1_b2", "x".repeat(21).as_str()] {
            assert_eq!(validate_community_name(ok), Ok(()), "{ok:?} should be valid");
        }
        for bad in ["ab", "has space", "dash-ed", "émoji", "x".repeat(22).as_str()] {
            assert_eq!(
                validate_community_name(bad),
                Err(Error::InvalidName {
                    name: String::from(bad)
                }),
            );
        }
    }

    #[test]
    fn defaults_on_creation() {
        let draft = NewCommunity {
            name: String::from("rustaceans"),
            description: String::from("  All things Rust, all the time  "),
            color: None,
            icon: None,
            category: Some(String::from("Programming")),
        };
        draft.validate().unwrap();
        let c = draft.into_community(CommunityId(9));
        assert_eq!(c.member_count, 1);
        assert_eq!(c.color, DEFAULT_COLOR);
        assert_eq!(c.icon, DEFAULT_ICON);
        assert_eq!(c.category, "Programming");
        assert_eq!(c.description, "All things Rust, all the time");
        assert!(c.is_named("RustAceans"));
    }

    #[test]
    fn short_description() {
        let draft = NewCommunity {
            name: String::from("rustaceans"),
            description: String::from("too short"),
            color: None,
            icon: None,
            category: None,
        };
        assert_eq!(
            draft.validate(),
            Err(Error::FieldTooShort {
                field: String::from("description"),
                min: 10
            }),
        );
    }
}
