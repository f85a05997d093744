//! List site content

use anyhow::Result;

use crate::helpers::format_date;
use crate::query::PageNumber;
use crate::Press;

/// List site content by type
pub async fn run(press: &Press, content_type: &str, page: usize) -> Result<()> {
    match content_type {
        "article" | "articles" => {
            let listing = press.service.articles_page(PageNumber::new(page)).await?;
            println!(
                "Articles ({}), page {} of {}:",
                listing.total_items,
                listing.current_page,
                listing.total_pages.max(1)
            );
            for article in &listing.items {
                let date = article
                    .published_at
                    .map(|d| format_date(&d, "%Y-%m-%d"))
                    .unwrap_or_else(|| "----------".to_string());
                println!(
                    "  {} - {} [{}]",
                    date,
                    article.display_title(),
                    article.slug.as_deref().unwrap_or("-")
                );
            }
        }
        "category" | "categories" => {
            let categories = press.service.categories().await?;
            println!("Categories ({}):", categories.len());
            for category in categories {
                println!(
                    "  {} [{}]",
                    category.display_title(),
                    category.slug.as_deref().unwrap_or("-")
                );
                super::report_violations(
                    category.display_title(),
                    category.title.as_deref(),
                    &category.validate(),
                );
            }
        }
        "slug" | "slugs" => {
            let (articles, categories) =
                tokio::try_join!(press.service.article_slugs(), press.service.category_slugs())?;
            for slug in articles {
                println!("{}", crate::helpers::article_path(&slug));
            }
            for slug in categories {
                println!("{}", crate::helpers::category_path(&slug));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: articles, categories, slugs",
                content_type
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_unknown_type() {
        let press = Press::new(SiteConfig::default(), Arc::new(MemoryStore::default()));
        assert!(run(&press, "tags", 1).await.is_err());
        assert!(run(&press, "articles", 1).await.is_ok());
        assert!(run(&press, "categories", 1).await.is_ok());
    }
}
