use crate::link::{pulse_link, pulse_link_with_base};

#[test]
fn test_link_uppercases_ticker_once() {
    let link = pulse_link("sber");
    assert_eq!(link, "https://www.tinkoff.ru/invest/stocks/SBER/pulse/");
    assert_eq!(link.matches("SBER").count(), 1);
    assert!(!link.contains("sber"));
}

#[test]
fn test_link_is_case_insensitive() {
    assert_eq!(pulse_link("VkCo"), pulse_link("VKCO"));
    assert_eq!(pulse_link(" lkoh "), pulse_link("LKOH"));
}

#[test]
fn test_link_with_archive_base() {
    let base = "https://web.archive.org/web/20230208212008/https://www.tinkoff.ru/invest/stocks/";
    assert_eq!(
        pulse_link_with_base(base, "sber"),
        "https://web.archive.org/web/20230208212008/https://www.tinkoff.ru/invest/stocks/SBER/pulse/"
    );
}
