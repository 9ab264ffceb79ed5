pub mod catalog_pager;
pub mod executor;
pub mod feed_client;
pub mod ozon_api_client;
pub mod reconciler;
pub mod yandex_api_client;

#[cfg(test)]
pub(crate) mod test_support;

pub use executor::SyncExecutor;
pub use feed_client::FeedClient;
pub use ozon_api_client::OzonApiClient;
pub use yandex_api_client::YandexApiClient;
