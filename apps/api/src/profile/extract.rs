//! Typed extraction of a rendered LinkedIn profile page.
//!
//! LinkedIn renders each visible string twice: once in a `span[aria-hidden="true"]`
//! and once for screen readers. We read only the aria-hidden copies.

use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

use super::{Education, Experience, ProfileRecord};

/// Sections whose list items count as accomplishments.
const ACCOMPLISHMENT_ANCHORS: [&str; 4] = [
    "honors_and_awards",
    "certifications",
    "projects",
    "publications",
];

/// What the page yielded. Anything the markup did not contain stays `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedPage {
    pub name: Option<String>,
    pub about: Option<String>,
    pub experiences: Vec<ScrapedExperience>,
    pub educations: Vec<ScrapedEducation>,
    pub skills: Vec<String>,
    pub accomplishments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedExperience {
    pub title: Option<String>,
    pub company: Option<String>,
    pub date_range: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapedEducation {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub date_range: Option<String>,
}

impl From<ScrapedPage> for ProfileRecord {
    fn from(page: ScrapedPage) -> Self {
        ProfileRecord {
            full_name: page.name.unwrap_or_default(),
            about: page.about.unwrap_or_default(),
            experiences: page
                .experiences
                .into_iter()
                .map(|e| Experience {
                    title: e.title.unwrap_or_default(),
                    company: e.company.unwrap_or_default(),
                    date_range: e.date_range.unwrap_or_default(),
                    description: e.description.unwrap_or_default(),
                })
                .collect(),
            educations: page
                .educations
                .into_iter()
                .map(|e| Education {
                    institution: e.institution.unwrap_or_default(),
                    degree: e.degree.unwrap_or_default(),
                    date_range: e.date_range.unwrap_or_default(),
                })
                .collect(),
            skills: page.skills,
            accomplishments: page.accomplishments,
            ..Default::default()
        }
    }
}

struct Selectors {
    name: Selector,
    heading_xlarge: Selector,
    section: Selector,
    list_item: Selector,
    visible_text: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| {
        let parse = |css: &str| Selector::parse(css).expect("static selector is valid CSS");
        Selectors {
            name: parse(".pv-top-card h1, h1.top-card-layout__title, main section h1"),
            heading_xlarge: parse(".text-heading-xlarge"),
            section: parse("section"),
            list_item: parse("li.artdeco-list__item, li.pvs-list__paged-list-item"),
            visible_text: parse(r#"span[aria-hidden="true"]"#),
        }
    })
}

/// Full extraction pass over the page HTML.
pub fn extract_profile(html: &str) -> ScrapedPage {
    let doc = Html::parse_document(html);
    let sel = selectors();

    let name = doc
        .select(&sel.name)
        .map(element_text)
        .find(|t| !t.is_empty());

    let about = section(&doc, "about").and_then(|s| {
        let texts = visible_texts(s);
        (!texts.is_empty()).then(|| texts.join("\n"))
    });

    let experiences = section_items(&doc, "experience")
        .into_iter()
        .map(|texts| {
            let mut texts = texts.into_iter();
            ScrapedExperience {
                title: texts.next(),
                company: texts.next().map(|c| leading_segment(&c)),
                date_range: texts.next(),
                // index 3 is the location line when present
                description: {
                    let rest: Vec<String> = texts.skip(1).collect();
                    (!rest.is_empty()).then(|| rest.join("\n"))
                },
            }
        })
        .collect();

    let educations = section_items(&doc, "education")
        .into_iter()
        .map(|texts| {
            let mut texts = texts.into_iter();
            ScrapedEducation {
                institution: texts.next(),
                degree: texts.next(),
                date_range: texts.next(),
            }
        })
        .collect();

    let skills = section_items(&doc, "skills")
        .into_iter()
        .filter_map(|texts| texts.into_iter().next())
        .collect();

    let accomplishments = ACCOMPLISHMENT_ANCHORS
        .iter()
        .flat_map(|anchor| section_items(&doc, anchor))
        .filter_map(|texts| texts.into_iter().next())
        .collect();

    ScrapedPage {
        name,
        about,
        experiences,
        educations,
        skills,
        accomplishments,
    }
}

/// Simplified name lookup used when the full pass finds no name.
pub fn extract_name_fallback(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    doc.select(&selectors().heading_xlarge)
        .map(element_text)
        .find(|t| !t.is_empty())
}

/// The `<section>` that carries an anchor element with the given id.
fn section<'a>(doc: &'a Html, anchor: &str) -> Option<ElementRef<'a>> {
    let anchor_sel = Selector::parse(&format!("#{anchor}")).ok()?;
    doc.select(&selectors().section)
        .find(|s| s.select(&anchor_sel).next().is_some())
}

fn section_items(doc: &Html, anchor: &str) -> Vec<Vec<String>> {
    let Some(section) = section(doc, anchor) else {
        return Vec::new();
    };
    section
        .select(&selectors().list_item)
        .map(visible_texts)
        .filter(|texts| !texts.is_empty())
        .collect()
}

/// Visible strings inside `el`, skipping section headings and consecutive repeats.
fn visible_texts(el: ElementRef<'_>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for span in el.select(&selectors().visible_text) {
        if in_heading(span) {
            continue;
        }
        let text = element_text(span);
        if text.is_empty() || out.last() == Some(&text) {
            continue;
        }
        out.push(text);
    }
    out
}

fn in_heading(el: ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| matches!(a.value().name(), "h2" | "h3"))
}

/// Element text with whitespace runs collapsed.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// "Acme · Full-time" -> "Acme"
fn leading_segment(text: &str) -> String {
    text.split(" · ").next().unwrap_or(text).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE_HTML: &str = r#"
        <html><head><title>Ada Lovelace | LinkedIn</title></head><body><main>
          <section class="pv-top-card">
            <h1 class="text-heading-xlarge">  Ada
                Lovelace </h1>
          </section>
          <section>
            <div id="about"></div>
            <h2><span aria-hidden="true">About</span></h2>
            <div class="inline-show-more-text">
              <span aria-hidden="true">I write programs for engines.</span>
              <span class="visually-hidden">I write programs for engines.</span>
            </div>
          </section>
          <section>
            <div id="experience"></div>
            <h2><span aria-hidden="true">Experience</span></h2>
            <ul>
              <li class="artdeco-list__item">
                <span aria-hidden="true">Analyst</span>
                <span aria-hidden="true">Analytical Engine Co · Full-time</span>
                <span aria-hidden="true">1842 - 1843 · 1 yr</span>
                <span aria-hidden="true">London</span>
                <span aria-hidden="true">Wrote the first published algorithm.</span>
              </li>
              <li class="artdeco-list__item">
                <span aria-hidden="true">Translator</span>
                <span aria-hidden="true">Taylor's Scientific Memoirs</span>
              </li>
            </ul>
          </section>
          <section>
            <div id="education"></div>
            <ul>
              <li class="artdeco-list__item">
                <span aria-hidden="true">Home tutoring</span>
                <span aria-hidden="true">Mathematics</span>
                <span aria-hidden="true">1828 - 1835</span>
              </li>
            </ul>
          </section>
          <section>
            <div id="skills"></div>
            <ul>
              <li class="artdeco-list__item"><span aria-hidden="true">Mathematics</span></li>
              <li class="artdeco-list__item"><span aria-hidden="true">Programming</span></li>
            </ul>
          </section>
          <section>
            <div id="honors_and_awards"></div>
            <ul>
              <li class="artdeco-list__item"><span aria-hidden="true">Ada language namesake</span></li>
            </ul>
          </section>
        </main></body></html>
    "#;

    #[test]
    fn test_extracts_name_with_collapsed_whitespace() {
        let page = extract_profile(PROFILE_HTML);
        assert_eq!(page.name.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn test_about_skips_heading_and_screen_reader_copy() {
        let page = extract_profile(PROFILE_HTML);
        assert_eq!(page.about.as_deref(), Some("I write programs for engines."));
    }

    #[test]
    fn test_experience_items() {
        let page = extract_profile(PROFILE_HTML);
        assert_eq!(page.experiences.len(), 2);
        let first = &page.experiences[0];
        assert_eq!(first.title.as_deref(), Some("Analyst"));
        assert_eq!(first.company.as_deref(), Some("Analytical Engine Co"));
        assert_eq!(first.date_range.as_deref(), Some("1842 - 1843 · 1 yr"));
        assert_eq!(
            first.description.as_deref(),
            Some("Wrote the first published algorithm.")
        );
        let second = &page.experiences[1];
        assert_eq!(second.date_range, None);
        assert_eq!(second.description, None);
    }

    #[test]
    fn test_education_skills_and_accomplishments() {
        let page = extract_profile(PROFILE_HTML);
        assert_eq!(
            page.educations,
            vec![ScrapedEducation {
                institution: Some("Home tutoring".to_string()),
                degree: Some("Mathematics".to_string()),
                date_range: Some("1828 - 1835".to_string()),
            }]
        );
        assert_eq!(page.skills, vec!["Mathematics", "Programming"]);
        assert_eq!(page.accomplishments, vec!["Ada language namesake"]);
    }

    #[test]
    fn test_missing_sections_default_to_empty_record_fields() {
        let record: ProfileRecord =
            extract_profile("<html><body><main><h1>Nobody</h1></main></body></html>").into();
        assert_eq!(record.about, "");
        assert!(record.experiences.is_empty());
        assert!(record.educations.is_empty());
        assert!(record.skills.is_empty());
        assert!(record.accomplishments.is_empty());
    }

    #[test]
    fn test_partial_items_default_to_empty_strings() {
        let record: ProfileRecord = extract_profile(PROFILE_HTML).into();
        assert_eq!(record.experiences[1].date_range, "");
        assert_eq!(record.experiences[1].description, "");
        assert_eq!(record.full_name, "Ada Lovelace");
        assert_eq!(record.headline, "");
    }

    #[test]
    fn test_name_fallback_uses_heading_class() {
        let html = r#"<div><div class="text-heading-xlarge">Grace Hopper</div></div>"#;
        assert_eq!(extract_profile(html).name, None);
        assert_eq!(extract_name_fallback(html).as_deref(), Some("Grace Hopper"));
    }

    #[test]
    fn test_name_fallback_none_on_empty_page() {
        assert_eq!(extract_name_fallback("<html></html>"), None);
    }
}
