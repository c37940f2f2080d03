/// Family sharing
///
/// Groups of users that share boards. Invite codes are generated and
/// redeemed by server-side procedures; the client only normalizes what
/// the user typed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::client::SupabaseClient;
use super::RemoteError;

/// Length of an invite code
pub const INVITE_CODE_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    Member,
}

impl MemberRole {
    pub fn label(self) -> &'static str {
        match self {
            MemberRole::Owner => "Owner",
            MemberRole::Admin => "Admin",
            MemberRole::Member => "Member",
        }
    }

    /// Owners and admins may manage members and invite codes
    pub fn can_manage(self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FamilyMember {
    pub id: String,
    pub family_group_id: String,
    pub user_id: String,
    pub role: MemberRole,
    #[serde(default)]
    pub joined_at: Option<String>,
    #[serde(skip)]
    pub profile: Option<Profile>,
}

impl FamilyMember {
    pub fn display_name(&self) -> String {
        self.profile
            .as_ref()
            .and_then(|p| p.display_name.clone().or_else(|| p.email.clone()))
            .unwrap_or_else(|| self.user_id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FamilyGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(skip)]
    pub members: Vec<FamilyMember>,
}

impl FamilyGroup {
    pub fn role_of(&self, user: &str) -> Option<MemberRole> {
        self.members.iter().find(|m| m.user_id == user).map(|m| m.role)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InviteCode {
    pub code: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Outcome of redeeming an invite code
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JoinResult {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub group_name: Option<String>,
}

/// Uppercase, keep ASCII letters and digits, truncate to six
pub fn normalize_invite_code(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(INVITE_CODE_LEN)
        .collect()
}

/// Procedures sometimes return a single row as a one-element array
fn single_row<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, RemoteError> {
    let value = match value {
        Value::Array(mut rows) if !rows.is_empty() => rows.swap_remove(0),
        Value::Array(_) => return Err(RemoteError::UnexpectedResponse("empty result".into())),
        other => other,
    };
    serde_json::from_value(value).map_err(|e| RemoteError::UnexpectedResponse(e.to_string()))
}

fn in_list(ids: &[String]) -> String {
    format!("in.({})", ids.join(","))
}

impl SupabaseClient {
    /// Create a group and add `owner` to it as its owner
    pub async fn create_family_group(&self, name: &str, owner: &str) -> Result<FamilyGroup, RemoteError> {
        let response = self
            .rest_post("family_groups")
            .header("Prefer", "return=representation")
            .json(&json!({ "name": name.trim(), "created_by": owner }))
            .send()
            .await?;
        let body: Value = Self::parse_response(response).await?;
        let group: FamilyGroup = single_row(body)?;

        let response = self
            .rest_post("family_members")
            .json(&json!({ "family_group_id": group.id, "user_id": owner, "role": MemberRole::Owner }))
            .send()
            .await?;
        if let Err(e) = Self::check_status(response).await {
            // a group without an owner is unreachable; roll it back
            log::warn!("⚠️  Could not add owner to group {}: {e}", group.id);
            if let Err(cleanup) = self.delete_family_group(&group.id).await {
                log::warn!("⚠️  Cleanup of group {} failed: {cleanup}", group.id);
            }
            return Err(e);
        }

        log::info!("👪 Created family group '{}'", group.name);
        Ok(group)
    }

    /// Groups `user` belongs to, with all of their members and profiles
    pub async fn list_family_groups(&self, user: &str) -> Result<Vec<FamilyGroup>, RemoteError> {
        let group_ids = self.member_group_ids(user).await?;
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .rest_get("family_groups")
            .query(&[("select", "*".to_string()), ("id", in_list(&group_ids))])
            .send()
            .await?;
        let mut groups: Vec<FamilyGroup> = Self::parse_response(response).await?;

        let response = self
            .rest_get("family_members")
            .query(&[
                ("select", "id,family_group_id,user_id,role,joined_at".to_string()),
                ("family_group_id", in_list(&group_ids)),
            ])
            .send()
            .await?;
        let members: Vec<FamilyMember> = Self::parse_response(response).await?;

        let mut user_ids: Vec<String> = members.iter().map(|m| m.user_id.clone()).collect();
        user_ids.sort();
        user_ids.dedup();
        let profiles = match self.fetch_profiles(&user_ids).await {
            Ok(profiles) => profiles,
            Err(e) => {
                log::warn!("⚠️  Member profiles unavailable: {e}");
                HashMap::new()
            }
        };

        for group in groups.iter_mut() {
            group.members = members
                .iter()
                .filter(|m| m.family_group_id == group.id)
                .cloned()
                .map(|mut m| {
                    m.profile = profiles.get(&m.user_id).cloned();
                    m
                })
                .collect();
        }
        Ok(groups)
    }

    async fn fetch_profiles(&self, ids: &[String]) -> Result<HashMap<String, Profile>, RemoteError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let response = self
            .rest_get("profiles")
            .query(&[("select", "id,email,display_name".to_string()), ("id", in_list(ids))])
            .send()
            .await?;
        let profiles: Vec<Profile> = Self::parse_response(response).await?;
        Ok(profiles.into_iter().map(|p| (p.id.clone(), p)).collect())
    }

    /// Add an existing account to a group by email
    pub async fn add_family_member(&self, group_id: &str, email: &str, role: MemberRole) -> Result<(), RemoteError> {
        let email = email.trim().to_lowercase();
        let response = self
            .rpc("get_user_id_by_email")
            .json(&json!({ "user_email": email }))
            .send()
            .await?;
        let user_id: Option<String> = Self::parse_response(response).await?;
        let user_id = user_id.ok_or_else(|| {
            RemoteError::UnexpectedResponse(format!("no account for {email}"))
        })?;

        let response = self
            .rest_post("family_members")
            .json(&json!({ "family_group_id": group_id, "user_id": user_id, "role": role }))
            .send()
            .await?;
        Self::check_status(response).await
    }

    pub async fn remove_member(&self, member_id: &str) -> Result<(), RemoteError> {
        let response = self
            .rest_delete("family_members")
            .query(&[("id", format!("eq.{member_id}"))])
            .send()
            .await?;
        Self::check_status(response).await
    }

    pub async fn update_member_role(&self, member_id: &str, role: MemberRole) -> Result<(), RemoteError> {
        let response = self
            .rest_patch("family_members")
            .query(&[("id", format!("eq.{member_id}"))])
            .json(&json!({ "role": role }))
            .send()
            .await?;
        Self::check_status(response).await
    }

    pub async fn delete_family_group(&self, group_id: &str) -> Result<(), RemoteError> {
        let response = self
            .rest_delete("family_groups")
            .query(&[("id", format!("eq.{group_id}"))])
            .send()
            .await?;
        Self::check_status(response).await
    }

    pub async fn generate_invite_code(&self, group_id: &str) -> Result<InviteCode, RemoteError> {
        let response = self
            .rpc("generate_invite_code")
            .json(&json!({ "group_id": group_id }))
            .send()
            .await?;
        let body: Value = Self::parse_response(response).await?;
        single_row(body)
    }

    /// Redeem an invite code for the signed-in user
    pub async fn join_with_code(&self, code: &str) -> Result<JoinResult, RemoteError> {
        if self.current_user().is_none() {
            return Err(RemoteError::NotSignedIn);
        }
        let code = normalize_invite_code(code);
        if code.len() != INVITE_CODE_LEN {
            return Ok(JoinResult {
                success: false,
                message: Some(format!("Invite codes are {INVITE_CODE_LEN} characters")),
                group_name: None,
            });
        }

        let response = self
            .rpc("join_group_with_code")
            .json(&json!({ "invite_code": code }))
            .send()
            .await?;
        let body: Value = Self::parse_response(response).await?;
        single_row(body)
    }
}
