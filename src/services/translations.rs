use crate::models::Locale;

/// Every user-facing string of the application for one locale.
#[derive(Debug)]
pub struct Translations {
    pub welcome: &'static str,
    pub description: &'static str,
    pub placeholder: &'static str,
    pub listening: &'static str,
    pub disclaimer: &'static str,
    pub new_chat: &'static str,
    pub clear_chat: &'static str,
    pub recent_chats: &'static str,
    pub no_recent: &'static str,
    pub untitled: &'static str,
    pub badge: &'static str,
    pub role: &'static str,
    pub course: &'static str,
    pub speak_tooltip: &'static str,
    pub send_tooltip: &'static str,
    pub thinking: &'static str,
    pub about: &'static str,
    pub suggestions: [&'static str; 5],
    /// Substitute reply when the backend answers without text.
    pub empty_response: &'static str,
    /// Substitute reply when the backend call fails.
    pub service_error: &'static str,
}

static PT_PT: Translations = Translations {
    welcome: "Olá! Eu sou o OrientAi.",
    description: "Sou o seu assistente virtual especializado no guia de mestrado do IPAM Porto. \
                  Como posso ajudar no seu percurso académico hoje?",
    placeholder: "Pergunte sobre as tipologias de tese, prazos ou regras...",
    listening: "A ouvir...",
    disclaimer: "O OrientAi pode cometer erros. Verifique as informações importantes no Guia \
                 oficial disponível no Canvas.",
    new_chat: "Nova Conversa",
    clear_chat: "Limpar Conversa",
    recent_chats: "Conversas Recentes",
    no_recent: "Nenhuma conversa recente",
    untitled: "Conversa sem título",
    badge: "Guia Mestrado IPAM",
    role: "Estudante IPAM",
    course: "Mestrado em Marketing",
    speak_tooltip: "Falar mensagem",
    send_tooltip: "Enviar mensagem (Enter)",
    thinking: "A pensar...",
    about: "Sobre o OrientAi",
    suggestions: [
        "Quais são as tipologias de tese disponíveis?",
        "Qual é a estrutura recomendada para uma Dissertação?",
        "Quais são as datas importantes no calendário?",
        "Quais as regras para uso de Inteligência Artificial?",
        "Como funciona a cerimónia de defesa?",
    ],
    empty_response: "Desculpe, não consegui processar a sua resposta no momento.",
    service_error: "Ocorreu um erro ao conectar com o serviço OrientAi. Por favor, tente \
                    novamente mais tarde.",
};

static EN: Translations = Translations {
    welcome: "Hello! I am OrientAi.",
    description: "I am your virtual assistant specialized in IPAM Porto's master's guide. \
                  How can I help with your academic journey today?",
    placeholder: "Ask about thesis typologies, deadlines, or rules...",
    listening: "Listening...",
    disclaimer: "OrientAi can make mistakes. Check important information in the official \
                 Guide available on Canvas.",
    new_chat: "New Chat",
    clear_chat: "Clear Chat",
    recent_chats: "Recent Chats",
    no_recent: "No recent chats",
    untitled: "Untitled chat",
    badge: "IPAM Master's Guide",
    role: "IPAM Student",
    course: "Master in Marketing",
    speak_tooltip: "Speak message",
    send_tooltip: "Send message (Enter)",
    thinking: "Thinking...",
    about: "About OrientAi",
    suggestions: [
        "What are the available thesis typologies?",
        "What is the recommended structure for a Dissertation?",
        "What are the important dates in the calendar?",
        "What are the rules for using Artificial Intelligence?",
        "How does the defense ceremony work?",
    ],
    empty_response: "Sorry, I could not process your response right now.",
    service_error: "An error occurred connecting to the OrientAi service. Please try again \
                    later.",
};

pub fn translations(locale: Locale) -> &'static Translations {
    match locale {
        Locale::PtPt => &PT_PT,
        Locale::En => &EN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_strings(t: &Translations) -> Vec<&'static str> {
        let mut strings = vec![
            t.welcome,
            t.description,
            t.placeholder,
            t.listening,
            t.disclaimer,
            t.new_chat,
            t.clear_chat,
            t.recent_chats,
            t.no_recent,
            t.untitled,
            t.badge,
            t.role,
            t.course,
            t.speak_tooltip,
            t.send_tooltip,
            t.thinking,
            t.about,
            t.empty_response,
            t.service_error,
        ];
        strings.extend(t.suggestions);
        strings
    }

    #[test]
    fn test_every_locale_is_complete() {
        for locale in Locale::ALL {
            for s in all_strings(translations(locale)) {
                assert!(!s.trim().is_empty(), "blank string in {:?}", locale);
            }
        }
    }

    #[test]
    fn test_fallbacks_are_distinct_and_localized() {
        let pt = translations(Locale::PtPt);
        let en = translations(Locale::En);
        assert_ne!(pt.empty_response, pt.service_error);
        assert_ne!(en.empty_response, en.service_error);
        assert_ne!(pt.empty_response, en.empty_response);
        assert_ne!(pt.service_error, en.service_error);
    }

    #[test]
    fn test_line_continuations_keep_single_spaces() {
        assert!(!EN.description.contains("  "));
        assert!(!PT_PT.service_error.contains("  "));
    }
}
