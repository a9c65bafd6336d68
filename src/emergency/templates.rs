/// A canned emergency situation the user can pick when sending an SOS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergencyTemplate {
    pub emoji: &'static str,
    pub title: &'static str,
    pub message: &'static str,
}

static CAMPING_TEMPLATES: [EmergencyTemplate; 8] = [
    EmergencyTemplate {
        emoji: "🏕️",
        title: "Lost While Hiking",
        message: "I am lost while hiking and need immediate assistance. I may be injured or unable to find my way back to the trail.",
    },
    EmergencyTemplate {
        emoji: "🦴",
        title: "Broken Bone/Injury",
        message: "I have suffered a serious injury (broken bone, sprain, or other injury) and cannot move safely. I need medical assistance.",
    },
    EmergencyTemplate {
        emoji: "🐍",
        title: "Snake Bite",
        message: "I have been bitten by a snake. I need immediate medical attention and help getting to safety.",
    },
    EmergencyTemplate {
        emoji: "🌊",
        title: "Water Emergency",
        message: "I am in trouble near water (river, lake, ocean) and need immediate rescue assistance.",
    },
    EmergencyTemplate {
        emoji: "🔥",
        title: "Fire Emergency",
        message: "There is a fire emergency in my area. I need help evacuating or the fire needs immediate attention.",
    },
    EmergencyTemplate {
        emoji: "🌪️",
        title: "Weather Emergency",
        message: "I am caught in severe weather conditions (storm, flood, extreme heat/cold) and need immediate assistance.",
    },
    EmergencyTemplate {
        emoji: "🚑",
        title: "Medical Emergency",
        message: "I am experiencing a medical emergency (chest pain, difficulty breathing, severe bleeding, etc.) and need immediate medical help.",
    },
    EmergencyTemplate {
        emoji: "🚨",
        title: "General Emergency",
        message: "I am in a general emergency situation and need immediate assistance. Please help me get to safety.",
    },
];

impl EmergencyTemplate {
    #[must_use]
    pub fn camping_templates() -> &'static [EmergencyTemplate] {
        &CAMPING_TEMPLATES
    }

    /// Case-insensitive lookup by title
    #[must_use]
    pub fn find(title: &str) -> Option<&'static EmergencyTemplate> {
        CAMPING_TEMPLATES
            .iter()
            .find(|template| template.title.eq_ignore_ascii_case(title.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue() {
        let templates = EmergencyTemplate::camping_templates();
        assert_eq!(templates.len(), 8);
        assert_eq!(templates[0].title, "Lost While Hiking");
        assert_eq!(templates[7].title, "General Emergency");
    }

    #[test]
    fn test_find_by_title() {
        let snake = EmergencyTemplate::find("snake bite").unwrap();
        assert_eq!(snake.emoji, "🐍");
        assert!(EmergencyTemplate::find("Alien Abduction").is_none());
    }
}
