//! Block storage endpoints

use super::nullable;
use crate::client::WarrenClient;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Disk as returned by the platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Disk {
    #[serde(deserialize_with = "nullable")]
    pub uuid: String,
    #[serde(deserialize_with = "nullable")]
    pub status: String,
    #[serde(deserialize_with = "nullable")]
    pub user_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub billing_account_id: i64,
    #[serde(deserialize_with = "nullable")]
    pub size_gb: i64,
    #[serde(deserialize_with = "nullable")]
    pub source_image_type: String,
    #[serde(deserialize_with = "nullable")]
    pub source_image: String,
    #[serde(deserialize_with = "nullable")]
    pub created_at: String,
    #[serde(deserialize_with = "nullable")]
    pub updated_at: String,
    #[serde(deserialize_with = "nullable")]
    pub snapshots: Vec<Snapshot>,
    #[serde(deserialize_with = "nullable")]
    pub status_comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    #[serde(deserialize_with = "nullable")]
    pub uuid: String,
    #[serde(rename = "sizeGb", deserialize_with = "nullable")]
    pub size_gb: i64,
    #[serde(deserialize_with = "nullable")]
    pub created_at: String,
    #[serde(deserialize_with = "nullable")]
    pub disk_uuid: String,
}

/// Provenance of a disk's initial contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceImageType {
    OsBase,
    Disk,
    Snapshot,
    External,
    Empty,
}

impl SourceImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceImageType::OsBase => "OS_BASE",
            SourceImageType::Disk => "DISK",
            SourceImageType::Snapshot => "SNAPSHOT",
            SourceImageType::External => "EXTERNAL",
            SourceImageType::Empty => "EMPTY",
        }
    }
}

impl FromStr for SourceImageType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "OS_BASE" => Ok(SourceImageType::OsBase),
            "DISK" => Ok(SourceImageType::Disk),
            "SNAPSHOT" => Ok(SourceImageType::Snapshot),
            "EXTERNAL" => Ok(SourceImageType::External),
            "EMPTY" => Ok(SourceImageType::Empty),
            other => Err(format!(
                "unknown source image type {:?} (expected OS_BASE, DISK, SNAPSHOT, EXTERNAL or EMPTY)",
                other
            )),
        }
    }
}

impl std::fmt::Display for SourceImageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create request; unset fields are not sent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateDiskRequest {
    pub size_gb: Option<i64>,
    pub billing_account_id: Option<i64>,
    pub source_image_type: Option<SourceImageType>,
    pub source_image: Option<String>,
}

impl CreateDiskRequest {
    pub fn form_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(size_gb) = self.size_gb {
            params.push(("size_gb", size_gb.to_string()));
        }
        if let Some(billing_account_id) = self.billing_account_id {
            params.push(("billing_account_id", billing_account_id.to_string()));
        }
        if let Some(source_image_type) = self.source_image_type {
            params.push(("source_image_type", source_image_type.as_str().to_string()));
        }
        if let Some(source_image) = &self.source_image {
            params.push(("source_image", source_image.clone()));
        }
        params
    }
}

pub struct DiskApi<'a> {
    client: &'a WarrenClient,
}

impl<'a> DiskApi<'a> {
    pub(crate) fn new(client: &'a WarrenClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, request: &CreateDiskRequest) -> Result<Disk> {
        let mut call = self.client.post("/storage/disks");
        for (key, value) in request.form_params() {
            call = call.form(key, value);
        }
        call.call().await
    }

    pub async fn get(&self, uuid: &str) -> Result<Disk> {
        self.client
            .get(format!("/storage/disk/{}", uuid))
            .call()
            .await
    }

    pub async fn list(&self) -> Result<Vec<Disk>> {
        self.client.get("/storage/disks").call().await
    }

    pub async fn delete(&self, uuid: &str) -> Result<()> {
        self.client
            .delete(format!("/storage/disk/{}", uuid))
            .call_no_content()
            .await
    }
}
