use crate::config::SiteConfig;
use crate::parsers::compile_selector;
use crate::parsers::search_page::{LinkCollector, selected_page};
use scraper::Html;

const SEARCH_PAGE: &str = r#"
<html><body>
  <ul class="jobs">
    <li><a href="/partner/jobListing.htm?pos=101&jobListingId=11">Data Scientist</a></li>
    <li><div><span><a href="/partner/jobListing.htm?pos=102&jobListingId=12">ML Engineer</a></span></div></li>
    <li><a href="/partner/jobListing.htm?pos=101&jobListingId=11#apply">Data Scientist (again)</a></li>
    <li><a href="https://www.glassdoor.com/partner/jobListing.htm?pos=103&jobListingId=13">Analyst</a></li>
  </ul>
  <a href="/Reviews/index.htm">Reviews</a>
  <a>No href</a>
  <div class="paginator">
    <button class="page">1</button>
    <button class="page selected css-1hq9k8 e13qs2071">2</button>
  </div>
</body></html>
"#;

fn collector() -> LinkCollector {
    LinkCollector::from_site(&SiteConfig::default()).unwrap()
}

#[test]
fn test_collects_distinct_absolute_links() {
    let links = collector().collect_html(SEARCH_PAGE);

    assert_eq!(links.count(), 3);
    assert_eq!(
        links.urls,
        vec![
            "https://www.glassdoor.com/partner/jobListing.htm?pos=101&jobListingId=11",
            "https://www.glassdoor.com/partner/jobListing.htm?pos=102&jobListingId=12",
            "https://www.glassdoor.com/partner/jobListing.htm?pos=103&jobListingId=13",
        ]
    );
}

#[test]
fn test_page_without_listings() {
    let links = collector().collect_html(r#"<a href="/Job/index.htm">Jobs</a>"#);
    assert!(links.is_empty());
    assert_eq!(links.count(), 0);
}

#[test]
fn test_selected_page_button() {
    let selector = compile_selector("button.page.selected").unwrap();
    let page = Html::parse_document(SEARCH_PAGE);
    assert_eq!(selected_page(&page, &selector).as_deref(), Some("2"));
    let empty = Html::parse_document("<div></div>");
    assert_eq!(selected_page(&empty, &selector), None);
}
