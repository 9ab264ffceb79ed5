use crate::shared::error::SyncResult;
use crate::shared::marketplaces::{MarketplaceApi, PageProgress};

/// Выкачать все артикулы (offer_id) из каталога маркетплейса.
///
/// Любая ошибка страницы прерывает обход целиком: частичный список не
/// возвращается, повторов нет.
pub async fn list_offer_identifiers(api: &dyn MarketplaceApi) -> SyncResult<Vec<String>> {
    let mut cursor = String::new();
    let mut offer_ids: Vec<String> = Vec::new();
    let mut pages = 0usize;

    loop {
        let page = api.fetch_catalog_page(&cursor).await?;
        pages += 1;
        let received = page.offer_ids.len();
        offer_ids.extend(page.offer_ids);

        tracing::debug!(
            "{}: catalog page {} received {} items, {} so far",
            api.target_label(),
            pages,
            received,
            offer_ids.len()
        );

        match page.progress {
            PageProgress::NextToken(Some(token)) if !token.is_empty() => {
                cursor = token;
            }
            PageProgress::NextToken(_) => break,
            PageProgress::Counted { last_id, total } => {
                if offer_ids.len() >= total {
                    break;
                }
                // Пустая страница при недобранном total: дальше API ничего не отдаст
                if received == 0 {
                    tracing::warn!(
                        "{}: catalog returned an empty page with {} of {} items collected",
                        api.target_label(),
                        offer_ids.len(),
                        total
                    );
                    break;
                }
                cursor = last_id;
            }
        }
    }

    tracing::info!(
        "{}: {} offers in catalog ({} pages)",
        api.target_label(),
        offer_ids.len(),
        pages
    );

    Ok(offer_ids)
}
