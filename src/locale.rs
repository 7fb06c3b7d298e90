/// UI language; selects labels, the system instruction and fallback hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Chinese,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Chinese => "zh",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Language::English),
            "zh" | "cn" | "chinese" | "zh-cn" => Some(Language::Chinese),
            _ => None,
        }
    }

    pub fn strings(&self) -> &'static Strings {
        match self {
            Language::English => &EN,
            Language::Chinese => &ZH,
        }
    }
}

pub struct Strings {
    pub user_label: &'static str,
    pub ai_label: &'static str,
    pub thinking: &'static str,
    pub welcome: &'static str,
    pub error_label: &'static str,
    pub system_prompt: &'static str,
    pub composer_title: &'static str,
    pub composer_hint: &'static str,
    pub echo_prefix: &'static str,
    pub echo_suffix: &'static str,
    pub hints: [&'static str; 3],
}

static EN: Strings = Strings {
    user_label: "You",
    ai_label: "AI",
    thinking: "Thinking…",
    welcome: "Ready.",
    error_label: "Backend unavailable, switched to a local reply",
    system_prompt: "Answer concisely, politely and accurately. Avoid marketing language and role-play.",
    composer_title: " Message (Enter to send, Alt+Enter for newline) ",
    composer_hint: "Type a message…",
    echo_prefix: "You said: \"",
    echo_suffix: "\". Got it.",
    hints: [
        "I can help summarize, polish, translate or outline key points.",
        "We can expand on this or narrow it down from here.",
        "Send a new direction or more details any time.",
    ],
};

static ZH: Strings = Strings {
    user_label: "你",
    ai_label: "回应",
    thinking: "处理中…",
    welcome: "准备就绪。",
    error_label: "后端不可用，已切换为本地回答。",
    system_prompt: "请以简洁、礼貌、准确的中文回答，避免多余营销或拟人话术。",
    composer_title: " 输入（Enter 发送，Alt+Enter 换行） ",
    composer_hint: "输入消息…",
    echo_prefix: "你说：\"",
    echo_suffix: "\"。已收到。",
    hints: [
        "可帮助总结、润色、翻译、整理要点。",
        "也可以在此基础上继续展开或收敛。",
        "随时输入新的方向或补充信息。",
    ],
};
