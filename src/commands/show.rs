//! Show one article with its related content

use anyhow::Result;

use crate::helpers::format_date;
use crate::Press;

/// Print an article's metadata, related articles and rendered body
pub async fn run(press: &Press, slug: &str) -> Result<()> {
    let Some(view) = press
        .service
        .article_with_related(slug, press.config.related_count)
        .await?
    else {
        anyhow::bail!("No article with slug {:?}", slug);
    };
    let article = &view.article;

    println!("{}", article.display_title());
    if let Some(date) = article.published_at {
        println!("Published: {}", format_date(&date, &press.config.date_format));
    }
    if !article.categories.is_empty() {
        let titles: Vec<&str> = article.categories.iter().map(|c| c.display_title()).collect();
        println!("Categories: {}", titles.join(", "));
    }
    super::report_violations(slug, article.title.as_deref(), &article.validate());

    println!();
    println!("{}", press.renderer.render_html(&article.body));

    if !view.related.is_empty() {
        println!();
        println!("Related:");
        for related in &view.related {
            println!(
                "  {} [{}]",
                related.display_title(),
                related.slug.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}
