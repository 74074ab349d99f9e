//! Presentational building blocks of the page.
//!
//! Everything here is a pure mapping from content records to [`Markup`]: one
//! row per record, in input order, no filtering or sorting.

use crate::config::Link;
use crate::descriptor::{DescriptorError, ImageDescriptor};
use crate::types::{Education, Publication, Section};
use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};

/// Education history as `ul.education`.
pub fn education_list(items: &[Education]) -> Markup {
    html! {
        ul.education {
            @for item in items {
                (education_item(item))
            }
        }
    }
}

fn education_item(item: &Education) -> Markup {
    html! {
        li {
            b { (item.degree) } ", " (item.university) ", "
            i { "Advisor: " a href=(item.advisor.url) { (item.advisor.name) } "." }
        }
    }
}

/// Publications block: heading plus `ul.publications`.
pub fn publication_list(items: &[Publication]) -> Markup {
    html! {
        div {
            h2 { "Publications" }
            ul.publications {
                @for item in items {
                    (publication_item(item))
                }
            }
        }
    }
}

fn publication_item(item: &Publication) -> Markup {
    html! {
        li {
            a href=(item.url) { (item.title) }
            br;
            i { (item.authors) ". " (item.conference) "." }
        }
    }
}

/// Render markdown to HTML.
pub fn markdown(body: &str) -> String {
    let parser = Parser::new(body);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

/// A prose section with its heading.
pub fn prose_section(section: &Section) -> Markup {
    html! {
        div {
            h2 { (section.title) }
            (PreEscaped(markdown(&section.body)))
        }
    }
}

/// `<picture>` with one `<source>` per format and a fallback `<img>`.
pub fn responsive_picture(
    src: &ImageDescriptor,
    class: &str,
    alt: &str,
    sizes: &str,
) -> Result<Markup, DescriptorError> {
    let fallback = src.image_url_for(None, None)?;
    let (width, height) = src.dimensions;
    Ok(html! {
        picture {
            @for &format in &src.image_types {
                source type=(format.mime()) srcset=(src.srcset(format)) sizes=(sizes);
            }
            img class=(class) src=(fallback) alt=(alt) width=(width) height=(height);
        }
    })
}

/// Profile links, one per line.
pub fn link_lines(links: &[Link]) -> Markup {
    html! {
        @for link in links {
            a href=(link.url) { (link.label) } br;
        }
    }
}
