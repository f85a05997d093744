//! Page assembly: turns composed reads into template contexts

use chrono::{Datelike, Utc};
use serde::Serialize;
use tera::Context;

use crate::assets::{CdnAssetResolver, Fit, ImageOptions};
use crate::config::{ManifestIcon, SiteConfig};
use crate::helpers::{article_path, category_path, date_xml, format_date, page_link};
use crate::query::{ArticleView, CategoryListing, Homepage, Paginated};
use crate::render::to_plain_text;
use crate::schema::{Article, Category};
use crate::templates::{
    ArticleData, CardData, ImageData, NavCategory, PaginationData, SiteData, StatusData,
};
use crate::Press;

/// Card images are cropped to 16:9
const CARD_IMAGE_WIDTH: u32 = 400;
const CARD_IMAGE_HEIGHT: u32 = 225;

/// Shared context of every page: site data and the category menu
pub fn base_context(press: &Press, categories: &[Category]) -> Context {
    let config = &press.config;
    let mut context = Context::new();
    context.insert(
        "site",
        &SiteData {
            title: config.title.clone(),
            description: config.description.clone(),
            url: config.url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            year: Utc::now().year(),
        },
    );
    context.insert("nav", &nav(categories));
    context
}

pub fn home(press: &Press, categories: &[Category], homepage: &Homepage) -> Context {
    let mut context = base_context(press, categories);
    let hero = homepage
        .hero
        .as_ref()
        .map(|article| {
            let options = ImageOptions::width(press.config.hero_image_width)
                .fit(Fit::Crop)
                .auto_format();
            card(press, article, options)
        });
    context.insert("label", &homepage.label);
    context.insert("hero", &hero);
    context.insert("articles", &cards(press, &homepage.latest.items));
    context.insert("pagination", &pagination(&homepage.latest, "/"));
    context
}

pub fn article(press: &Press, categories: &[Category], view: &ArticleView) -> Context {
    let article = &view.article;
    let mut context = base_context(press, categories);

    let image = article.main_image.as_ref().and_then(|image| {
        let options = ImageOptions::width(press.config.article_image_width)
            .fit(Fit::Crop)
            .auto_format();
        press
            .images
            .resolve_with(image, options)
            .map(|asset| ImageData {
                url: asset.url,
                alt: article.main_image_alt().to_string(),
                width: asset.dimensions.map(|d| d.width),
                height: asset.dimensions.map(|d| d.height),
            })
    });
    let content = Some(press.renderer.render_html(&article.body)).filter(|html| !html.is_empty());

    context.insert(
        "article",
        &ArticleData {
            title: article.display_title().to_string(),
            date: article
                .published_at
                .map(|d| format_date(&d, &press.config.date_format)),
            date_xml: article.published_at.map(|d| date_xml(&d)),
            categories: nav(&article.categories),
            image,
            content,
            description: description(article),
        },
    );
    context.insert("related", &cards(press, &view.related));
    context.insert("path", &article_path(article.slug.as_deref().unwrap_or_default()));
    context
}

pub fn category(press: &Press, categories: &[Category], listing: &CategoryListing) -> Context {
    let mut context = base_context(press, categories);
    let slug = listing.category.slug.as_deref().unwrap_or_default();
    let path = category_path(slug);

    let mut category = serde_json::Map::new();
    category.insert(
        "title".to_string(),
        listing.category.display_title().into(),
    );
    category.insert(
        "description".to_string(),
        listing
            .category
            .description
            .clone()
            .unwrap_or_default()
            .into(),
    );
    context.insert("category", &category);
    context.insert("articles", &cards(press, &listing.articles.items));
    context.insert("pagination", &pagination(&listing.articles, &path));
    context.insert("path", &path);
    context
}

pub fn status(press: &Press, categories: &[Category], code: u16) -> Context {
    let (heading, message) = match code {
        404 => (
            "Page Not Found",
            "Sorry, the page you are looking for does not exist.",
        ),
        503 => (
            "Temporarily Unavailable",
            "Content could not be loaded right now. Please try again shortly.",
        ),
        _ => ("Something Went Wrong", "An unexpected error occurred."),
    };
    let mut context = base_context(press, categories);
    context.insert(
        "status",
        &StatusData {
            code,
            heading: heading.to_string(),
            message: message.to_string(),
        },
    );
    context
}

/// Web app manifest, served as JSON
#[derive(Debug, Serialize)]
pub struct WebManifest<'a> {
    pub name: &'a str,
    pub short_name: &'a str,
    pub description: &'a str,
    pub start_url: &'a str,
    pub display: &'a str,
    pub background_color: &'a str,
    pub theme_color: &'a str,
    pub icons: &'a [ManifestIcon],
}

pub fn manifest(config: &SiteConfig) -> WebManifest<'_> {
    let manifest = &config.manifest;
    WebManifest {
        name: &config.title,
        short_name: &manifest.short_name,
        description: &config.description,
        start_url: &manifest.start_url,
        display: &manifest.display,
        background_color: &manifest.background_color,
        theme_color: &manifest.theme_color,
        icons: &manifest.icons,
    }
}

fn nav(categories: &[Category]) -> Vec<NavCategory> {
    categories
        .iter()
        .filter_map(|c| {
            let slug = c.slug.as_deref().filter(|s| !s.is_empty())?;
            Some(NavCategory {
                title: c.display_title().to_string(),
                path: category_path(slug),
            })
        })
        .collect()
}

fn cards(press: &Press, articles: &[Article]) -> Vec<CardData> {
    articles
        .iter()
        .filter(|a| a.slug.as_deref().map(|s| !s.is_empty()).unwrap_or(false))
        .map(|a| card(press, a, card_image_options()))
        .collect()
}

fn card_image_options() -> ImageOptions {
    ImageOptions::width(CARD_IMAGE_WIDTH)
        .height(CARD_IMAGE_HEIGHT)
        .fit(Fit::Crop)
}

fn card(press: &Press, article: &Article, options: ImageOptions) -> CardData {
    CardData {
        title: article.display_title().to_string(),
        path: article_path(article.slug.as_deref().unwrap_or_default()),
        excerpt: article
            .excerpt
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "No excerpt available.".to_string()),
        date: article
            .published_at
            .map(|d| format_date(&d, &press.config.date_format)),
        date_xml: article.published_at.map(|d| date_xml(&d)),
        categories: nav(&article.categories),
        image: card_image(&press.images, article, options),
    }
}

fn card_image(
    images: &CdnAssetResolver,
    article: &Article,
    options: ImageOptions,
) -> Option<ImageData> {
    let image = article.main_image.as_ref()?;
    let asset = images.resolve_with(image, options)?;
    Some(ImageData {
        url: asset.url,
        alt: article.main_image_alt().to_string(),
        width: asset.dimensions.map(|d| d.width),
        height: asset.dimensions.map(|d| d.height),
    })
}

/// Meta description: the excerpt, else the start of the body text
fn description(article: &Article) -> String {
    match article.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(excerpt) => excerpt.to_string(),
        None => crate::helpers::truncate(&to_plain_text(&article.body), 160, None),
    }
}

fn pagination<T>(page: &Paginated<T>, base: &str) -> PaginationData {
    PaginationData {
        current: page.current_page,
        total: page.total_pages,
        prev_link: page.previous_page().map(|p| page_link(base, p)),
        next_link: page.next_page().map(|p| page_link(base, p)),
    }
}
