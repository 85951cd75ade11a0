use crate::domain::model::QueryResult;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// 顯示用的完整路徑
    fn location(&self, path: &str) -> String;
}

/// Anything that can hand back the rendered HTML of a page.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Read-only relational store executing fixed statements.
#[async_trait]
pub trait QuerySource: Send + Sync {
    async fn fetch_all(&self, sql: &str) -> Result<QueryResult>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Send;
    type Transformed: Send;

    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<Self::Transformed>;
    /// 回傳輸出位置；沒有任何資料寫出時為 `None`
    async fn load(&self, result: Self::Transformed) -> Result<Option<String>>;
}
