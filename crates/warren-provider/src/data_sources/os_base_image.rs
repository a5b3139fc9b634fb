//! OS base image data source

use crate::api::BaseImage;
use crate::classify::into_cloud_error;
use crate::client::WarrenClient;
use crate::mapper::base_image_to_model;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warren_cloud::{CloudError, ResourceKind, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsBaseImageModel {
    pub os_name: Option<String>,
    pub display_name: Option<String>,
    /// Optional constraint; the image must publish this version
    pub os_version: Option<String>,
    pub is_app_catalog: Option<bool>,
    pub is_default: Option<bool>,
    pub versions: Option<Vec<OsBaseImageVersionModel>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsBaseImageVersionModel {
    pub display_name: Option<String>,
    pub os_version: Option<String>,
    pub published: Option<bool>,
}

impl OsBaseImageModel {
    fn matches(&self, image: &BaseImage) -> bool {
        let selected = self.os_name.as_deref() == Some(image.os_name.as_str())
            || self.display_name.as_deref() == Some(image.display_name.as_str());

        selected
            && self
                .os_version
                .as_deref()
                .is_none_or(|wanted| image.versions.iter().any(|v| v.os_version == wanted))
    }

    fn describe(&self) -> String {
        let filter = match (&self.display_name, &self.os_name) {
            (Some(name), _) => format!("display name: {}", name),
            (None, Some(os_name)) => format!("OS name: {}", os_name),
            (None, None) => "no name".to_string(),
        };

        match &self.os_version {
            Some(version) => format!("{} (Version {})", filter, version),
            None => filter,
        }
    }
}

pub struct OsBaseImageDataSource {
    client: Arc<WarrenClient>,
}

impl OsBaseImageDataSource {
    pub fn new(client: Arc<WarrenClient>) -> Self {
        Self { client }
    }

    pub async fn read(&self, query: OsBaseImageModel) -> Result<OsBaseImageModel> {
        if query.os_name.is_none() && query.display_name.is_none() {
            return Err(CloudError::InvalidConfig(
                "OS base image lookup needs os_name or display_name".to_string(),
            ));
        }

        let images = self
            .client
            .virtual_machines()
            .base_images()
            .await
            .map_err(|e| into_cloud_error(ResourceKind::OsBaseImage, query.describe(), e))?;

        let image = select(&images, &query)?;
        Ok(base_image_to_model(image, query.os_version.clone()))
    }
}

fn select<'a>(images: &'a [BaseImage], query: &OsBaseImageModel) -> Result<&'a BaseImage> {
    images
        .iter()
        .find(|image| query.matches(image))
        .ok_or_else(|| CloudError::NoMatch {
            kind: ResourceKind::OsBaseImage,
            filter: query.describe(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BaseImageVersion;

    fn images() -> Vec<BaseImage> {
        let version = |v: &str| BaseImageVersion {
            os_version: v.to_string(),
            display_name: v.to_string(),
            published: true,
        };

        vec![
            BaseImage {
                os_name: "ubuntu".to_string(),
                display_name: "Ubuntu".to_string(),
                is_default: true,
                versions: vec![version("22.04"), version("24.04")],
                ..Default::default()
            },
            BaseImage {
                os_name: "debian".to_string(),
                display_name: "Debian".to_string(),
                versions: vec![version("12")],
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_select_with_version() {
        let all = images();
        let query = OsBaseImageModel {
            os_name: Some("ubuntu".to_string()),
            os_version: Some("24.04".to_string()),
            ..Default::default()
        };
        let image = select(&all, &query).unwrap();
        assert_eq!(image.os_name, "ubuntu");

        let model = base_image_to_model(image, query.os_version.clone());
        assert_eq!(model.os_version.as_deref(), Some("24.04"));
        assert_eq!(model.is_default, Some(true));
        let versions: Vec<_> = model
            .versions
            .unwrap()
            .into_iter()
            .filter_map(|v| v.os_version)
            .collect();
        assert_eq!(versions, vec!["22.04", "24.04"]);
    }

    #[test]
    fn test_select_by_display_name() {
        let query = OsBaseImageModel {
            display_name: Some("Debian".to_string()),
            ..Default::default()
        };
        assert_eq!(select(&images(), &query).unwrap().os_name, "debian");
    }

    #[test]
    fn test_unknown_version() {
        let query = OsBaseImageModel {
            os_name: Some("debian".to_string()),
            os_version: Some("11".to_string()),
            ..Default::default()
        };
        let err = select(&images(), &query).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("OS name: debian (Version 11)"));
    }
}
