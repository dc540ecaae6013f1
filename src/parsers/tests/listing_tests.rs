use crate::config::ListingSelectorConfig;
use crate::parsers::listing::ListingExtractor;
use crate::results::NA;

const LISTING_PAGE: &str = r#"
<html><body>
  <div class="css-ur1szg e11nt52q0">
    <div class="css-16nw49e e11nt52q1">Acme Analytics<span class="css-1pmc6te e11nt52q4">4.1★</span></div>
    <div class="css-17x2pwl e11nt52q6">Senior Data Scientist</div>
    <div class="css-1v5elnn e11nt52q2">Austin, TX</div>
    <span class="small css-10zcshf e1v3ed7e1">$120K - $150K (Glassdoor est.)</span>
  </div>
  <div id="InfoFields">
    <div><label>Headquarters</label><span id="headquarters">Austin, TX</span></div>
    <div><label>Founded</label><span id="yearFounded">2009</span></div>
    <div><label>Industry</label><span id="primaryIndustry.industryName">Internet</span></div>
    <div><label>Revenue</label><span id="revenue">$100 to $500 million (USD)</span></div>
    <div><label>Size</label><span id="size">501 to 1000 Employees</span></div>
    <div><label>Type</label><span id="type">Company - Private</span></div>
    <div><label>Sector</label><span id="primaryIndustry.sectorName">Information Technology</span></div>
  </div>
</body></html>
"#;

fn extractor() -> ListingExtractor {
    ListingExtractor::new(&ListingSelectorConfig::default()).unwrap()
}

#[test]
fn test_full_listing() {
    let listing = extractor().extract_html(LISTING_PAGE, "https://www.glassdoor.com/job/1", "TX");

    assert_eq!(listing.company_name, "Acme Analytics");
    assert_eq!(listing.star_rating, "4.1");
    assert_eq!(listing.offered_role, "Senior Data Scientist");
    assert_eq!(listing.role_location, "Austin, TX");
    assert_eq!(listing.salary, "$120K - $150K (Glassdoor est.)");
    assert_eq!(listing.headquarters, "Austin, TX");
    assert_eq!(listing.founded, "2009");
    assert_eq!(listing.industry, "Internet");
    assert_eq!(listing.revenue, "$100 to $500 million (USD)");
    assert_eq!(listing.size, "501 to 1000 Employees");
    assert_eq!(listing.company_type, "Company - Private");
    assert_eq!(listing.sector, "Information Technology");
    assert_eq!(listing.source_url, "https://www.glassdoor.com/job/1");
    assert_eq!(listing.search_state, "TX");
}

#[test]
fn test_unrated_company_keeps_name() {
    let html = r#"
    <div class="css-ur1szg e11nt52q0">
      <div class="css-16nw49e e11nt52q1">Quiet Labs</div>
      <div class="css-17x2pwl e11nt52q6">Data Analyst</div>
    </div>"#;
    let listing = extractor().extract_html(html, "u", "CA");

    assert_eq!(listing.company_name, "Quiet Labs");
    assert_eq!(listing.star_rating, NA);
    assert_eq!(listing.offered_role, "Data Analyst");
    assert_eq!(listing.role_location, NA);
    assert_eq!(listing.salary, NA);
}

#[test]
fn test_missing_field_does_not_abort_record() {
    let html = LISTING_PAGE.replace(r#"<span id="revenue">$100 to $500 million (USD)</span>"#, "");
    let listing = extractor().extract_html(&html, "u", "TX");

    assert_eq!(listing.revenue, NA);
    assert_eq!(listing.size, "501 to 1000 Employees");
    assert_eq!(listing.company_name, "Acme Analytics");
}

#[test]
fn test_missing_banner_marks_banner_fields() {
    let html = r#"<div id="InfoFields"><span id="yearFounded">1999</span></div>"#;
    let listing = extractor().extract_html(html, "u", "WA");

    assert_eq!(listing.company_name, NA);
    assert_eq!(listing.star_rating, NA);
    assert_eq!(listing.offered_role, NA);
    assert_eq!(listing.role_location, NA);
    assert_eq!(listing.salary, NA);
    assert_eq!(listing.founded, "1999");
    assert_eq!(listing.headquarters, NA);
}

#[test]
fn test_empty_page_is_all_na() {
    let listing = extractor().extract_html("<html></html>", "u", "WA");
    assert_eq!(listing.company_name, NA);
    assert_eq!(listing.sector, NA);
    assert_eq!(listing.source_url, "u");
}

#[test]
fn test_invalid_selector_is_reported() {
    let config = ListingSelectorConfig {
        banner: "div[".to_string(),
        ..ListingSelectorConfig::default()
    };
    assert!(ListingExtractor::new(&config).is_err());
}

#[test]
fn test_inline_markup_keeps_words_whole() {
    let html = r#"
    <div class="css-ur1szg e11nt52q0">
      <div class="css-16nw49e e11nt52q1">Acme<b>Corp</b></div>
      <div class="css-17x2pwl e11nt52q6">Data Scien<em>tist</em></div>
      <div class="css-1v5elnn e11nt52q2">Austin,
          TX</div>
      <span class="small css-10zcshf e1v3ed7e1">$120<span>K</span> - $150<span>K</span></span>
    </div>"#;
    let listing = extractor().extract_html(html, "u", "TX");

    assert_eq!(listing.company_name, "AcmeCorp");
    assert_eq!(listing.offered_role, "Data Scientist");
    assert_eq!(listing.role_location, "Austin, TX");
    assert_eq!(listing.salary, "$120K - $150K");
    assert_eq!(crate::normalize::salary::normalize_salary(&listing.salary).unwrap(), 135.0);
}
