//! Detects questions that need live data (weather, news, prices, ...)

use regex::Regex;
use std::sync::OnceLock;

fn search_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:(?:web|search|find)\b|搜索|查)\s*[:：]?\s*")
            .expect("search prefix pattern is valid")
    })
}

fn realtime_keywords() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)\b(?:weather|temperature|forecast|now|today|tomorrow|this week|real-?time|latest|",
            r"news|headlines?|prices?|stocks?|exchange rates?|flights?|traffic)\b",
            r"|天气|气温|温度|现在|今日|今天|明天|本周|实时|最新|新闻|快讯|价格|股价|汇率|航班|路况|限号"
        ))
        .expect("realtime keyword pattern is valid")
    })
}

fn weather_keywords() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:weather|temperature|forecast)\b|天气|气温|温度")
            .expect("weather keyword pattern is valid")
    })
}

/// Starts with a search prefix or mentions something time-sensitive
pub fn is_web_query(text: &str) -> bool {
    search_prefix().is_match(text) || realtime_keywords().is_match(text)
}

pub fn is_weather_query(text: &str) -> bool {
    weather_keywords().is_match(text)
}

/// Text with any leading search prefix removed, trimmed
pub fn strip_search_prefix(text: &str) -> String {
    search_prefix().replace(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_queries() {
        assert!(is_web_query("search rust 1.80 release notes"));
        assert!(is_web_query("Web: tokio"));
        assert!(is_web_query("搜索 上海美食"));
        assert!(is_web_query("查一下航线"));
        // prefix must be a whole word
        assert!(!is_web_query("findings from the paper"));
    }

    #[test]
    fn test_realtime_keywords() {
        assert!(is_web_query("what's the weather today"));
        assert!(is_web_query("latest news on the election"));
        assert!(is_web_query("BTC price?"));
        assert!(is_web_query("北京明天天气"));
        assert!(is_web_query("美元汇率"));
        assert!(!is_web_query("explain ownership in rust"));
        assert!(!is_web_query("帮我润色这段话"));
    }

    #[test]
    fn test_weather_detection() {
        assert!(is_weather_query("what's the weather today"));
        assert!(is_weather_query("Temperature in Oslo"));
        assert!(is_weather_query("上海气温"));
        assert!(!is_weather_query("latest news"));
    }

    #[test]
    fn test_every_weather_query_is_a_web_query() {
        for text in ["forecast for Paris", "Temperature in Oslo", "上海温度", "weather"] {
            assert!(is_weather_query(text), "{}", text);
            assert!(is_web_query(text), "{}", text);
        }
    }

    #[test]
    fn test_strip_search_prefix() {
        assert_eq!(strip_search_prefix("search   rust async"), "rust async");
        assert_eq!(strip_search_prefix("WEB: tokio"), "tokio");
        assert_eq!(strip_search_prefix("搜索 上海美食"), "上海美食");
        assert_eq!(strip_search_prefix("weather in Paris"), "weather in Paris");
    }
}
