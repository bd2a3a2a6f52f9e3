use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentJson {
    pub filename: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentsResponse {
    pub documents: Vec<DocumentJson>,
}

impl DocumentsResponse {
    pub fn from_names(names: Vec<String>) -> Self {
        Self {
            documents: names
                .into_iter()
                .map(|filename| DocumentJson { filename })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
