use kioskview::services::url_classifier::{is_web_url, same_host, UrlClassifier, UrlClassifierTrait};
use rstest::rstest;

#[rstest]
#[case("https://nvr.local/protect/dashboard", true)]
#[case("https://nvr.local/protect/dashboard/abc?x=1", true)]
#[case("https://nvr.local/protect/dashboardX", true)]
#[case("https://nvr.local/protect/devices", false)]
#[case("https://nvr.local/", false)]
#[case("not a url", false)]
#[case("", false)]
fn test_is_dashboard_cases(#[case] url: &str, #[case] expected: bool) {
    assert_eq!(UrlClassifier::default().is_dashboard(url), expected);
}

#[rstest]
#[case("https://nvr.local/login", true)]
#[case("https://nvr.local/login?redirect=%2Fprotect", true)]
#[case("https://nvr.local/protect/login", false)]
#[case("://bad", false)]
fn test_is_login_page_cases(#[case] url: &str, #[case] expected: bool) {
    assert_eq!(UrlClassifier::default().is_login_page(url), expected);
}

#[rstest]
#[case("https://nvr.local/protect/dashboard/cam1", true)]
#[case("https://nvr.local/login", true)]
#[case("https://nvr.local/protect/timelapse", false)]
#[case("garbage", false)]
fn test_is_home_cases(#[case] url: &str, #[case] expected: bool) {
    assert_eq!(UrlClassifier::default().is_home(url), expected);
}

#[test]
fn test_custom_prefixes_are_honoured() {
    let classifier = UrlClassifier::new("/live", "/signin");
    assert!(classifier.is_dashboard("https://a/live/1"));
    assert!(classifier.is_login_page("https://a/signin"));
    assert!(!classifier.is_dashboard("https://a/protect/dashboard"));
}

#[rstest]
#[case("https://nvr.local/a", "https://NVR.local/b", true)]
#[case("https://nvr.local/a", "https://nvr.local:443/b", true)]
#[case("http://nvr.local/a", "http://nvr.local:80/b", true)]
#[case("https://nvr.local/a", "http://nvr.local/b", false)]
#[case("https://nvr.local:7443/a", "https://nvr.local/b", false)]
#[case("https://nvr.local/a", "https://other.local/a", false)]
#[case("https://nvr.local/a", "bad url", false)]
fn test_same_host_cases(#[case] a: &str, #[case] b: &str, #[case] expected: bool) {
    assert_eq!(same_host(a, b), expected);
}

#[rstest]
#[case("https://docs.example.com/help", true)]
#[case("http://nvr.local:8080/x", true)]
#[case("javascript:alert(1)", false)]
#[case("file:///etc/passwd", false)]
#[case("about:blank", false)]
#[case("not a url", false)]
fn test_is_web_url_cases(#[case] url: &str, #[case] expected: bool) {
    assert_eq!(is_web_url(url), expected);
}
