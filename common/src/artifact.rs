use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Photo,
    Video,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Photo => "photo",
            ArtifactKind::Video => "video",
        }
    }

    pub fn default_extension(&self) -> &'static str {
        match self {
            ArtifactKind::Photo => "jpg",
            ArtifactKind::Video => "mp4",
        }
    }

    /// File extension for an encoded `mime_type`, ignoring codec parameters.
    pub fn extension_for(&self, mime_type: &str) -> String {
        let essence = mime_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        let subtype = essence.split_once('/').map(|(_, sub)| sub).unwrap_or("");
        match subtype {
            "jpeg" | "pjpeg" => "jpg".to_string(),
            "x-matroska" => "mkv".to_string(),
            "quicktime" => "mov".to_string(),
            sub if !sub.is_empty() && sub.chars().all(|c| c.is_ascii_alphanumeric()) => sub.to_string(),
            _ => self.default_extension().to_string(),
        }
    }

    /// `photo-<timestamp>.jpg` or `video-<timestamp>.mp4` for the default formats.
    pub fn file_name(&self, timestamp: &str, mime_type: &str) -> String {
        format!("{}-{}.{}", self.as_str(), timestamp, self.extension_for(mime_type))
    }
}

/// The single exportable result. A new photo or clip replaces whatever was here.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact<B> {
    Photo { blob: B, mime_type: String },
    Video { blob: B, mime_type: String },
}

impl<B> Artifact<B> {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Photo { .. } => ArtifactKind::Photo,
            Artifact::Video { .. } => ArtifactKind::Video,
        }
    }

    pub fn blob(&self) -> &B {
        match self {
            Artifact::Photo { blob, .. } | Artifact::Video { blob, .. } => blob,
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            Artifact::Photo { mime_type, .. } | Artifact::Video { mime_type, .. } => mime_type,
        }
    }

    pub fn file_name(&self, timestamp: &str) -> String {
        self.kind().file_name(timestamp, self.mime_type())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub kind: ArtifactKind,
    pub mime_type: String,
    pub size_bytes: u64,
}
