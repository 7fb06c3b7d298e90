/// How replies are obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Call the completion API directly with a stored key
    Direct,
    /// Go through the configured proxy base, with web-query routing
    Proxy,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Direct => "direct",
            Policy::Proxy => "proxy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "direct" | "openai" | "api" => Some(Policy::Direct),
            "proxy" => Some(Policy::Proxy),
            _ => None,
        }
    }

    pub fn all() -> Vec<Policy> {
        vec![Policy::Proxy, Policy::Direct]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Policy::Direct => "Direct API",
            Policy::Proxy => "Proxy",
        }
    }
}
