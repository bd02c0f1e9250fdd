/// Available commands and autocomplete logic
#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "dashboard",
    aliases: &["d", "home", "stats"],
    description: "Store statistics overview",
  },
  Command {
    name: "users",
    aliases: &["u", "user", "customers"],
    description: "Manage user accounts",
  },
  Command {
    name: "products",
    aliases: &["p", "product"],
    description: "Manage the product catalog",
  },
  Command {
    name: "categories",
    aliases: &["c", "cat", "category"],
    description: "Manage categories",
  },
  Command {
    name: "subcategories",
    aliases: &["s", "sub", "subcat"],
    description: "Manage subcategories",
  },
  Command {
    name: "reviews",
    aliases: &["r", "review"],
    description: "Moderate product reviews",
  },
  Command {
    name: "logout",
    aliases: &["signout"],
    description: "Sign out and forget the stored credential",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit c9s",
  },
];

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
      continue;
    }

    // Fuzzy match on alias
    if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      matches.push((cmd, 5));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn exact_match() {
    let suggestions = get_suggestions("products");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "products");
  }

  #[test]
  fn alias_match() {
    let suggestions = get_suggestions("u");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "users");
  }

  #[test]
  fn prefix_match() {
    let suggestions = get_suggestions("cat");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "categories");
  }

  #[test]
  fn prefix_prefers_name_over_fuzzy() {
    let suggestions = get_suggestions("sub");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "subcategories");
  }

  #[test]
  fn fuzzy_match() {
    let suggestions = get_suggestions("board");
    assert!(suggestions.iter().all(|c| c.name != "board"));
    let suggestions = get_suggestions("view");
    assert!(suggestions.iter().any(|c| c.name == "reviews"));
  }
}
