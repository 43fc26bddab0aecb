use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// EBS sub-record of a block device mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EbsVolume {
    #[serde(default)]
    volume_type: Option<String>,
    #[serde(default)]
    volume_size: Option<u64>,
}

impl EbsVolume {
    pub fn new(volume_type: impl Into<String>) -> Self {
        Self {
            volume_type: Some(volume_type.into()),
            ..Self::default()
        }
    }

    pub fn volume_type(&self) -> Option<&str> {
        self.volume_type.as_deref()
    }

    pub fn volume_size(&self) -> Option<u64> {
        self.volume_size
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockDeviceMapping {
    device_name: String,
    #[serde(default)]
    ebs: Option<EbsVolume>,
}

impl BlockDeviceMapping {
    pub fn new(device_name: impl Into<String>, ebs: Option<EbsVolume>) -> Self {
        Self {
            device_name: device_name.into(),
            ebs,
        }
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn ebs(&self) -> Option<&EbsVolume> {
        self.ebs.as_ref()
    }
}

/// Provider-side machine image record, as returned by an image search.
///
/// Field names follow the provider's describe-images output so catalogs can
/// be deserialized straight from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageCandidate {
    image_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    creation_date: String,
    #[serde(default)]
    architecture: String,
    #[serde(default)]
    owner_id: Option<String>,
    #[serde(default)]
    image_owner_alias: Option<String>,
    #[serde(default)]
    root_device_name: Option<String>,
    #[serde(default)]
    root_device_type: Option<String>,
    #[serde(default)]
    virtualization_type: Option<String>,
    #[serde(default)]
    block_device_mappings: Vec<BlockDeviceMapping>,
}

impl ImageCandidate {
    pub fn new(image_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_creation_date(mut self, creation_date: impl Into<String>) -> Self {
        self.creation_date = creation_date.into();
        self
    }

    pub fn with_architecture(mut self, architecture: impl Into<String>) -> Self {
        self.architecture = architecture.into();
        self
    }

    pub fn with_owner(mut self, owner_id: Option<&str>, owner_alias: Option<&str>) -> Self {
        self.owner_id = owner_id.map(str::to_string);
        self.image_owner_alias = owner_alias.map(str::to_string);
        self
    }

    /// Set the root device and its mapping in one go.
    pub fn with_root_device(
        mut self,
        device_name: impl Into<String>,
        root_device_type: impl Into<String>,
        volume_type: Option<&str>,
    ) -> Self {
        let device_name = device_name.into();
        self.block_device_mappings.push(BlockDeviceMapping::new(
            device_name.clone(),
            volume_type.map(EbsVolume::new),
        ));
        self.root_device_name = Some(device_name);
        self.root_device_type = Some(root_device_type.into());
        self
    }

    /// Append a non-root mapping, eg. an extra data volume.
    pub fn with_block_device(mut self, mapping: BlockDeviceMapping) -> Self {
        self.block_device_mappings.push(mapping);
        self
    }

    pub fn with_virtualization_type(mut self, virtualization_type: impl Into<String>) -> Self {
        self.virtualization_type = Some(virtualization_type.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.image_id
    }

    /// Free-text display name
    /// eg. ubuntu/images/hvm-ssd/ubuntu-bionic-18.04-amd64-server-20180912
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parsed creation timestamp. Accepts RFC 3339 (what the provider
    /// returns) and the plain `YYYY-MM-DD HH:MM:SS` form, read as UTC.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.creation_date.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }

    // eg. x86_64
    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub fn owner_alias(&self) -> Option<&str> {
        self.image_owner_alias.as_deref()
    }

    pub fn root_device_name(&self) -> Option<&str> {
        self.root_device_name.as_deref()
    }

    /// `ebs` or `instance-store`
    pub fn root_device_type(&self) -> Option<&str> {
        self.root_device_type.as_deref()
    }

    /// `hvm` or `paravirtual`
    pub fn virtualization_type(&self) -> Option<&str> {
        self.virtualization_type.as_deref()
    }

    pub fn block_device_mappings(&self) -> &[BlockDeviceMapping] {
        &self.block_device_mappings
    }

    /// The block device mapping whose device name is the root device name.
    pub fn root_device_mapping(&self) -> Option<&BlockDeviceMapping> {
        let root = self.root_device_name.as_deref()?;
        self.block_device_mappings
            .iter()
            .find(|mapping| mapping.device_name() == root)
    }

    pub fn root_volume_type(&self) -> Option<&str> {
        self.root_device_mapping()?.ebs()?.volume_type()
    }
}

#[cfg(test)]
mod tests {
    use super::ImageCandidate;
    use chrono::{TimeZone, Utc};

    #[test]
    fn deserializes_describe_images_record() {
        let json = r#"{
            "ImageId": "ami-0abc",
            "Name": "CentOS Linux 7 x86_64 HVM EBS 1602",
            "CreationDate": "2016-03-01T12:00:00.000Z",
            "Architecture": "x86_64",
            "ImageOwnerAlias": "aws-marketplace",
            "RootDeviceName": "/dev/sda1",
            "RootDeviceType": "ebs",
            "VirtualizationType": "hvm",
            "BlockDeviceMappings": [
                { "DeviceName": "/dev/sdb", "VirtualName": "ephemeral0" },
                { "DeviceName": "/dev/sda1", "Ebs": { "VolumeType": "gp2", "VolumeSize": 8 } }
            ]
        }"#;

        let image: ImageCandidate = serde_json::from_str(json).unwrap();

        assert_eq!(image.id(), "ami-0abc");
        assert_eq!(image.owner_alias(), Some("aws-marketplace"));
        assert_eq!(image.owner_id(), None);
        assert_eq!(image.root_volume_type(), Some("gp2"));
        assert_eq!(
            image.root_device_mapping().and_then(|m| m.ebs()).and_then(|e| e.volume_size()),
            Some(8)
        );
        assert_eq!(
            image.created_at(),
            Some(Utc.with_ymd_and_hms(2016, 3, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn root_volume_type_ignores_non_root_mappings() {
        let image = ImageCandidate::new("ami-1", "x")
            .with_root_device("/dev/xvda", "ebs", None)
            .with_block_device(super::BlockDeviceMapping::new(
                "/dev/sdb",
                Some(super::EbsVolume::new("gp2")),
            ));

        assert_eq!(image.root_volume_type(), None);
    }

    #[test]
    fn created_at_accepts_plain_timestamps() {
        let image = ImageCandidate::new("ami-1", "x").with_creation_date("2015-06-01 10:20:30");
        assert_eq!(
            image.created_at(),
            Some(Utc.with_ymd_and_hms(2015, 6, 1, 10, 20, 30).unwrap())
        );
    }

    #[test]
    fn created_at_is_none_for_garbage() {
        let image = ImageCandidate::new("ami-1", "x").with_creation_date("yesterday");
        assert_eq!(image.created_at(), None);
    }
}
