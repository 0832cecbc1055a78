//! User-facing texts for rosters, statistics and the registration dialogue

use std::collections::BTreeMap;

use crate::storage::TeamStats;

pub const NAME_EXAMPLE: &str = "Пример: Иванов Иван Иванович";

pub fn welcome_new_user() -> String {
    format!(
        "👋 Добро пожаловать на нулевую сессию!\n\n\
         📝 Пожалуйста, введите ваше ФИО (Фамилия Имя Отчество):\n\n{}",
        NAME_EXAMPLE
    )
}

pub fn welcome_back(full_name: &str, team_number: u32) -> String {
    format!(
        "👋 С возвращением, {}!\n\n✅ Вы в команде №{}\n\nИспользуйте кнопки ниже:",
        full_name, team_number
    )
}

pub fn your_team(full_name: &str, team_number: u32) -> String {
    format!(
        "👋 {}!\n\n✅ Вы в команде №{}\n\nДля просмотра списка всех команд используйте /list",
        full_name, team_number
    )
}

pub fn ask_name() -> String {
    format!("📝 Пожалуйста, введите ваше ФИО (Фамилия Имя Отчество):\n\n{}", NAME_EXAMPLE)
}

pub fn ask_name_again() -> String {
    format!("📝 Пожалуйста, введите ваше ФИО заново:\n\n{}", NAME_EXAMPLE)
}

pub fn invalid_name() -> String {
    format!("❌ Пожалуйста, введите полное ФИО (Фамилия Имя Отчество)\n\n{}", NAME_EXAMPLE)
}

pub fn confirm_name(full_name: &str) -> String {
    format!("✅ Проверьте ваши данные:\n\nФИО: {}\n\nВсё верно?", full_name)
}

pub fn registered(full_name: &str, team_number: u32) -> String {
    format!(
        "🎉 Поздравляем, {}!\n\n🏆 Вы в команде №{}!\n\nТеперь вы можете использовать кнопки ниже:",
        full_name, team_number
    )
}

pub fn cancelled() -> String {
    "Регистрация отменена.\nЕсли захотите зарегистрироваться, используйте кнопки ниже:".to_string()
}

pub fn not_registered_hint() -> String {
    "🎯 Нажмите кнопку «Узнать свою команду» или отправьте /start, чтобы зарегистрироваться.".to_string()
}

pub fn unknown_command(help: &str) -> String {
    format!("🤔 Неизвестная команда.\n\n{}", help)
}

pub fn admin_only() -> String {
    "❌ Эта команда только для администраторов".to_string()
}

pub fn bot_alive(total: u64) -> String {
    format!("🔄 Бот работает! Зарегистрировано участников: {}", total)
}

pub fn storage_failure() -> String {
    "⚠️ Не удалось обработать запрос. Попробуйте ещё раз чуть позже.".to_string()
}

pub fn unexpected_failure() -> String {
    "⚠️ Что-то пошло не так. Отправьте /start, чтобы начать заново.".to_string()
}

/// Roster listing, or `None` when nobody has registered yet.
pub fn format_rosters(rosters: &BTreeMap<u32, Vec<String>>) -> Option<String> {
    if rosters.values().all(Vec::is_empty) {
        return None;
    }

    let mut response = String::from("📋 СПИСОК КОМАНД И УЧАСТНИКОВ:\n\n");
    for (team_number, members) in rosters {
        response.push_str(&format!("🏆 КОМАНДА {} ({} чел.):\n", team_number, members.len()));
        if members.is_empty() {
            response.push_str("   —\n");
        }
        for (i, member) in members.iter().enumerate() {
            response.push_str(&format!("   {}. {}\n", i + 1, member));
        }
        response.push('\n');
    }

    Some(response)
}

pub fn empty_rosters() -> String {
    "📋 Список команд пуст.".to_string()
}

/// Distribution summary, or `None` when nobody has registered yet.
pub fn format_stats(stats: &TeamStats) -> Option<String> {
    if stats.total == 0 || stats.counts.is_empty() {
        return None;
    }

    let mut response = String::from("📊 СТАТИСТИКА РАСПРЕДЕЛЕНИЯ:\n\n");
    for (team, count) in &stats.counts {
        response.push_str(&format!("Команда {}: {} чел.\n", team, count));
    }

    let teams = stats.counts.len();
    let average = stats.total as f64 / teams as f64;
    response.push_str(&format!("\nВсего участников: {}", stats.total));
    response.push_str(&format!("\nВсего команд: {}", teams));
    response.push_str(&format!("\nСреднее в команде: {:.1} чел.", average));

    Some(response)
}

pub fn empty_stats() -> String {
    "📊 Статистика пока недоступна.".to_string()
}

/// Splits `text` into chunks of at most `max_chars` characters.
///
/// Breaks on line boundaries where possible; a single line longer than
/// `max_chars` is cut mid-line. Whitespace-only chunks are dropped.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > max_chars {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                if piece.len() == max_chars {
                    chunks.push(piece.iter().collect());
                } else {
                    current = piece.iter().collect();
                    current_len = piece.len();
                }
            }
            continue;
        }

        current.push_str(line);
        current_len += line_len;
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks.retain(|chunk| !chunk.trim().is_empty());
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_rosters_numbers_members() {
        let mut rosters = BTreeMap::new();
        rosters.insert(2, vec!["Petrov Petr".to_string()]);
        rosters.insert(1, vec!["Ivanov Ivan".to_string(), "Sidorov Sidor".to_string()]);

        let text = format_rosters(&rosters).unwrap();
        assert_eq!(
            text,
            "📋 СПИСОК КОМАНД И УЧАСТНИКОВ:\n\n\
             🏆 КОМАНДА 1 (2 чел.):\n   1. Ivanov Ivan\n   2. Sidorov Sidor\n\n\
             🏆 КОМАНДА 2 (1 чел.):\n   1. Petrov Petr\n\n"
        );
    }

    #[test]
    fn test_format_rosters_marks_empty_team() {
        let mut rosters = BTreeMap::new();
        rosters.insert(1, vec!["Ivanov Ivan".to_string()]);
        rosters.insert(2, vec![]);

        let text = format_rosters(&rosters).unwrap();
        assert!(text.contains("🏆 КОМАНДА 2 (0 чел.):\n   —\n"));
    }

    #[test]
    fn test_format_rosters_empty() {
        assert_eq!(format_rosters(&BTreeMap::new()), None);

        let mut rosters = BTreeMap::new();
        rosters.insert(1, vec![]);
        assert_eq!(format_rosters(&rosters), None);
    }

    #[test]
    fn test_format_stats_summary() {
        let stats = TeamStats {
            counts: vec![(1, 2), (2, 1), (3, 1)],
            total: 4,
        };
        let text = format_stats(&stats).unwrap();
        assert_eq!(
            text,
            "📊 СТАТИСТИКА РАСПРЕДЕЛЕНИЯ:\n\n\
             Команда 1: 2 чел.\nКоманда 2: 1 чел.\nКоманда 3: 1 чел.\n\n\
             Всего участников: 4\nВсего команд: 3\nСреднее в команде: 1.3 чел."
        );
    }

    #[test]
    fn test_format_stats_empty() {
        let stats = TeamStats {
            counts: vec![(1, 0), (2, 0)],
            total: 0,
        };
        assert_eq!(format_stats(&stats), None);
    }

    #[test]
    fn test_split_message_short_text_untouched() {
        assert_eq!(split_message("hello\nworld\n", 100), vec!["hello\nworld\n".to_string()]);
    }

    #[test]
    fn test_split_message_on_line_boundaries() {
        let chunks = split_message("aaaa\nbbbb\ncccc\n", 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n".to_string(), "cccc\n".to_string()]);
    }

    #[test]
    fn test_split_message_long_line() {
        let chunks = split_message("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd".to_string(), "efgh".to_string(), "ij".to_string()]);
    }

    #[test]
    fn test_split_message_counts_characters() {
        let line = "я".repeat(10);
        let chunks = split_message(&line, 5);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.chars().count() == 5));
    }

    #[test]
    fn test_split_message_never_exceeds_limit() {
        let text: String = (0..500).map(|i| format!("   {}. Member Number{}\n", i, i)).collect();
        let chunks = split_message(&text, 4000);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 4000));
        assert_eq!(chunks.concat(), text);
    }
}
