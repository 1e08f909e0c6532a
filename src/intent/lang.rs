//! Per-language grammar and response tables.
//!
//! Each [`Language`] owns an independent bundle: ordered reminder patterns,
//! ordered query patterns, meridiem vocabulary, and response templates.
//! No pattern is shared across languages.

use regex::Regex;

use super::MeridiemHint;
use crate::reminder::types::Language;

/// Localized response templates. Placeholders use `{name}` syntax, see [`render`].
#[derive(Debug)]
pub struct Responses {
    /// `{time}`, `{task}`
    pub reminder_set: &'static str,
    /// `{time}`, `{task}`, `{days}`
    pub reminder_set_recurring: &'static str,
    pub no_reminders: &'static str,
    /// `{count}`, `{reminders}`
    pub reminders_list: &'static str,
    /// `{task}`, `{time}`
    pub reminder_item: &'static str,
    /// `{days}`; appended to an item that still repeats.
    pub repeating_suffix: &'static str,
    /// `{task}`
    pub reminder_triggered: &'static str,
    pub not_understood: &'static str,
    pub no_speech: &'static str,
    pub ready: &'static str,
    /// `{count}`
    pub cleared: &'static str,
    pub nothing_to_clear: &'static str,
    pub series_elapsed: &'static str,
    pub set_failed: &'static str,
    pub query_failed: &'static str,
    pub clear_failed: &'static str,
}

struct Grammar {
    reminder_patterns: &'static [&'static str],
    query_patterns: &'static [&'static str],
    meridiem_words: &'static [(&'static str, MeridiemHint)],
    responses: Responses,
}

static ENGLISH: Grammar = Grammar {
    reminder_patterns: &[
        r"remind me to (?P<task>.+) at (?P<hour>[0-9]{1,2})(?:[:.](?P<minute>[0-9]{2}))?\s*(?P<meridiem>a\.m\.?|p\.m\.?|am|pm|o'clock)?(?:\s+for\s+(?P<days>[0-9]+)\s+days?)?(?:\s|$)",
        r"set (?:a )?reminder (?:for|to) (?P<task>.+) at (?P<hour>[0-9]{1,2})(?:[:.](?P<minute>[0-9]{2}))?\s*(?P<meridiem>a\.m\.?|p\.m\.?|am|pm|o'clock)?(?:\s+for\s+(?P<days>[0-9]+)\s+days?)?(?:\s|$)",
        r"remember (?:to )?(?P<task>.+) at (?P<hour>[0-9]{1,2})(?:[:.](?P<minute>[0-9]{2}))?\s*(?P<meridiem>a\.m\.?|p\.m\.?|am|pm|o'clock)?(?:\s+for\s+(?P<days>[0-9]+)\s+days?)?(?:\s|$)",
    ],
    query_patterns: &[
        r"what do i have today",
        r"my reminders",
        r"what are my tasks",
        r"schedule for today",
        r"(?:show|list) (?:my )?reminders",
    ],
    meridiem_words: &[
        ("am", MeridiemHint::Morning),
        ("pm", MeridiemHint::Evening),
        ("o'clock", MeridiemHint::Neutral),
    ],
    responses: Responses {
        reminder_set: "Got it. I will remind you at {time} to {task}.",
        reminder_set_recurring: "Got it. I will remind you at {time} to {task} for the next {days} days.",
        no_reminders: "You have no reminders for today.",
        reminders_list: "You have {count} reminders today: {reminders}",
        reminder_item: "{task} at {time}",
        repeating_suffix: " (repeating for {days} more days)",
        reminder_triggered: "Reminder: {task}",
        not_understood: "Sorry, I didn't get that. Can you repeat?",
        no_speech: "I didn't hear anything. Please try again.",
        ready: "Careminder is ready. How can I help you today?",
        cleared: "Cleared {count} reminders for today.",
        nothing_to_clear: "No reminders to clear.",
        series_elapsed: "That time has already passed today, so there was nothing left to schedule.",
        set_failed: "Sorry, I couldn't set that reminder. Please try again.",
        query_failed: "Sorry, I couldn't get your schedule right now.",
        clear_failed: "Sorry, I couldn't clear your reminders.",
    },
};

static HINDI: Grammar = Grammar {
    reminder_patterns: &[
        r"मुझे (?P<task>.+) की याद दिलाओ (?P<hour>[0-9]{1,2})(?::(?P<minute>[0-9]{2}))?\s*(?P<meridiem>am|pm|सुबह|शाम|दोपहर|रात)?(?:\s+(?P<days>[0-9]+)\s+दिन(?: तक)?)?(?:\s|$)",
        r"(?P<task>.+) के लिए रिमाइंडर सेट करो (?P<hour>[0-9]{1,2})(?::(?P<minute>[0-9]{2}))?\s*(?P<meridiem>am|pm|सुबह|शाम|दोपहर|रात)?(?:\s+(?P<days>[0-9]+)\s+दिन(?: तक)?)?(?:\s|$)",
        r"(?:मुझे\s+)?(?:(?P<meridiem>सुबह|शाम|दोपहर|रात)\s+)?(?P<hour>[0-9]{1,2})(?::(?P<minute>[0-9]{2}))?\s*बजे (?P<task>.+?) (?:की )?याद दिलाओ(?:\s+(?P<days>[0-9]+)\s+दिन(?: तक)?)?(?:\s|$)",
    ],
    query_patterns: &[
        r"आज मेरे रिमाइंडर क्या हैं",
        r"मेरी अनुसूची",
        r"मेरे कार्य",
        r"मेरे रिमाइंडर",
    ],
    meridiem_words: &[
        ("am", MeridiemHint::Morning),
        ("pm", MeridiemHint::Evening),
        ("सुबह", MeridiemHint::Morning),
        ("दोपहर", MeridiemHint::Evening),
        ("शाम", MeridiemHint::Evening),
        ("रात", MeridiemHint::Evening),
    ],
    responses: Responses {
        reminder_set: "ठीक है, {time} बजे आपको {task} याद दिलाऊँगा।",
        reminder_set_recurring: "ठीक है, {time} बजे {task} अगले {days} दिनों तक याद दिलाऊँगा।",
        no_reminders: "आज के लिए कोई रिमाइंडर नहीं हैं।",
        reminders_list: "आज आपके {count} रिमाइंडर हैं: {reminders}",
        reminder_item: "{time} बजे {task}",
        repeating_suffix: " (अगले {days} दिन दोहराया जाएगा)",
        reminder_triggered: "रिमाइंडर: {task}",
        not_understood: "माफ़ कीजिए, मैं समझ नहीं पाया। कृपया दोहराएँ।",
        no_speech: "मैंने कुछ नहीं सुना। कृपया फिर से कोशिश करें।",
        ready: "Careminder तैयार है। मैं आपकी कैसे मदद कर सकता हूँ?",
        cleared: "आज के {count} रिमाइंडर हटा दिए गए।",
        nothing_to_clear: "हटाने के लिए कोई रिमाइंडर नहीं है।",
        series_elapsed: "यह समय आज निकल चुका है, इसलिए कोई रिमाइंडर सेट नहीं हुआ।",
        set_failed: "माफ़ कीजिए, मैं रिमाइंडर सेट नहीं कर पाया। कृपया फिर से कोशिश करें।",
        query_failed: "माफ़ कीजिए, मैं अभी आपकी अनुसूची नहीं देख पाया।",
        clear_failed: "माफ़ कीजिए, मैं रिमाइंडर हटा नहीं पाया।",
    },
};

static MARATHI: Grammar = Grammar {
    reminder_patterns: &[
        r"मला (?P<task>.+?)\s?(?:की|ची)? आठवण करून दे (?:(?P<meridiem>सकाळी|दुपारी|संध्याकाळी|रात्री)\s+)?(?P<hour>[0-9]{1,2})(?::(?P<minute>[0-9]{2}))? वाजता(?:\s+(?P<days>[0-9]+)\s*दिवस(?:ांसाठी| साठी)?)?(?:\s|$)",
        r"(?:मला\s+)?(?P<task>.+?)\s?(?:की|ची)? आठवण (?:(?P<meridiem>सकाळी|दुपारी|संध्याकाळी|रात्री)\s+)?(?P<hour>[0-9]{1,2})(?::(?P<minute>[0-9]{2}))? वाजता करून दे(?:\s+(?P<days>[0-9]+)\s*दिवस(?:ांसाठी| साठी)?)?(?:\s|$)",
        r"(?:मला\s+)?(?:(?P<meridiem>सकाळी|दुपारी|संध्याकाळी|रात्री)\s+)?(?P<hour>[0-9]{1,2})(?::(?P<minute>[0-9]{2}))? वाजता (?P<task>.+?)\s?(?:की|ची)? आठवण करून दे(?:\s+(?P<days>[0-9]+)\s*दिवस(?:ांसाठी| साठी)?)?(?:\s|$)",
    ],
    query_patterns: &[
        r"आज माझे काय काम आहे",
        r"माझे आठवण",
        r"माझ्या आठवणी",
        r"आज का शेड्यूल",
        r"आजचे वेळापत्रक",
    ],
    meridiem_words: &[
        ("सकाळी", MeridiemHint::Morning),
        ("दुपारी", MeridiemHint::Evening),
        ("संध्याकाळी", MeridiemHint::Evening),
        ("रात्री", MeridiemHint::Evening),
    ],
    responses: Responses {
        reminder_set: "ठीक आहे, मी {time} वाजता {task}ची आठवण करून देईन.",
        reminder_set_recurring: "ठीक आहे, मी {time} वाजता {task}ची आठवण पुढील {days} दिवसांसाठी करून देईन.",
        no_reminders: "आज तुमच्यासाठी कोणतीही आठवण नाही.",
        reminders_list: "आज तुमच्याकडे {count} आठवण आहेत: {reminders}",
        reminder_item: "{time} वाजता {task}",
        repeating_suffix: " (पुढील {days} दिवस पुन्हा)",
        reminder_triggered: "आठवण: {task}",
        not_understood: "माफ करा, मला समजले नाही. पुन्हा सांगाल का?",
        no_speech: "मला काहीही ऐकू आले नाही. कृपया पुन्हा प्रयत्न करा.",
        ready: "Careminder तयार आहे. आज मी तुमची कशी मदत करू शकतो?",
        cleared: "आजच्या {count} आठवणी काढून टाकल्या.",
        nothing_to_clear: "काढण्यासाठी कोणतीही आठवण नाही.",
        series_elapsed: "ही वेळ आज निघून गेली आहे, त्यामुळे कोणतीही आठवण ठेवली नाही.",
        set_failed: "माफ करा, मी आठवण ठेवू शकलो नाही. कृपया पुन्हा प्रयत्न करा.",
        query_failed: "माफ करा, मला आत्ता तुमचे वेळापत्रक मिळू शकले नाही.",
        clear_failed: "माफ करा, मी आठवणी काढू शकलो नाही.",
    },
};

/// Compiled strategy bundle for one language.
#[derive(Debug)]
pub struct LanguageTable {
    pub language: Language,
    pub(crate) reminder_patterns: Vec<Regex>,
    pub(crate) query_patterns: Vec<Regex>,
    meridiem_words: &'static [(&'static str, MeridiemHint)],
    pub responses: &'static Responses,
}

impl LanguageTable {
    fn compile(language: Language, grammar: &'static Grammar) -> Result<Self, regex::Error> {
        let compile_all = |patterns: &[&str]| -> Result<Vec<Regex>, regex::Error> {
            patterns.iter().map(|p| Regex::new(p)).collect()
        };
        Ok(Self {
            language,
            reminder_patterns: compile_all(grammar.reminder_patterns)?,
            query_patterns: compile_all(grammar.query_patterns)?,
            meridiem_words: grammar.meridiem_words,
            responses: &grammar.responses,
        })
    }

    /// Map a captured meridiem marker to a hint. Dots and spaces are ignored
    /// so `p.m.` and `pm` classify the same.
    pub fn classify_meridiem(&self, marker: &str) -> Option<MeridiemHint> {
        let key: String = marker.chars().filter(|c| !matches!(c, '.' | ' ')).collect();
        self.meridiem_words
            .iter()
            .find(|(word, _)| *word == key)
            .map(|(_, hint)| *hint)
    }
}

/// Lookup from language tag to its compiled table.
#[derive(Debug)]
pub struct LanguageRegistry {
    english: LanguageTable,
    hindi: LanguageTable,
    marathi: LanguageTable,
    default: Language,
}

impl LanguageRegistry {
    /// Compile the built-in tables. `default` answers for unknown tags.
    pub fn builtin(default: Language) -> Result<Self, regex::Error> {
        Ok(Self {
            english: LanguageTable::compile(Language::English, &ENGLISH)?,
            hindi: LanguageTable::compile(Language::Hindi, &HINDI)?,
            marathi: LanguageTable::compile(Language::Marathi, &MARATHI)?,
            default,
        })
    }

    pub fn table(&self, language: Language) -> &LanguageTable {
        match language {
            Language::English => &self.english,
            Language::Hindi => &self.hindi,
            Language::Marathi => &self.marathi,
        }
    }

    pub fn default_language(&self) -> Language {
        self.default
    }

    /// Resolve a caller-supplied tag, falling back to the default language.
    pub fn resolve_tag(&self, tag: &str) -> Language {
        tag.parse().unwrap_or_else(|_| {
            tracing::warn!(tag, fallback = %self.default, "no grammar for language tag");
            self.default
        })
    }
}

/// Fill `{name}` placeholders in a template.
pub fn render(template: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{name}}}"), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_compile() {
        let registry = LanguageRegistry::builtin(Language::English).unwrap();
        for lang in Language::ALL {
            let table = registry.table(lang);
            assert_eq!(table.language, lang);
            assert!(!table.reminder_patterns.is_empty());
            assert!(!table.query_patterns.is_empty());
        }
    }

    #[test]
    fn unknown_tag_falls_back_to_default() {
        let registry = LanguageRegistry::builtin(Language::Marathi).unwrap();
        assert_eq!(registry.resolve_tag("fr"), Language::Marathi);
        assert_eq!(registry.resolve_tag("hi"), Language::Hindi);
    }

    #[test]
    fn meridiem_classification_ignores_dots() {
        let registry = LanguageRegistry::builtin(Language::English).unwrap();
        let en = registry.table(Language::English);
        assert_eq!(en.classify_meridiem("p.m."), Some(MeridiemHint::Evening));
        assert_eq!(en.classify_meridiem("am"), Some(MeridiemHint::Morning));
        assert_eq!(en.classify_meridiem("o'clock"), Some(MeridiemHint::Neutral));
        assert_eq!(en.classify_meridiem("शाम"), None);

        let hi = registry.table(Language::Hindi);
        assert_eq!(hi.classify_meridiem("शाम"), Some(MeridiemHint::Evening));
    }

    #[test]
    fn render_fills_placeholders() {
        let text = render(
            ENGLISH.responses.reminder_set,
            &[("time", "06:00 PM"), ("task", "take medicine")],
        );
        assert_eq!(text, "Got it. I will remind you at 06:00 PM to take medicine.");
    }
}
