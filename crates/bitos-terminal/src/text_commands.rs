//! Text processing commands: head, tail, sort, uniq, wc, cut, sed, awk,
//! diff, less/more.
//!
//! Input always comes from files in the tree; there is no stdin. A missing
//! file produces the error line the real tool would print.

use bitos_types::error::{BitosError, ErrorKind, Result};

use crate::interpreter::{
    Command, CommandOutput, CommandRegistry, Environment, split_flags, take_quoted,
};

/// Register text processing commands.
pub fn register_text_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(HeadCmd));
    reg.register(Box::new(TailCmd));
    reg.register(Box::new(SortCmd));
    reg.register(Box::new(UniqCmd));
    reg.register(Box::new(WcCmd));
    reg.register(Box::new(CutCmd));
    reg.register(Box::new(SedCmd));
    reg.register(Box::new(AwkCmd));
    reg.register(Box::new(DiffCmd));
    reg.register(Box::new(LessCmd));
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read `target`, replacing a not-found error with `missing(target)`.
fn read_or<'e>(
    env: &'e Environment<'_>,
    target: &str,
    missing: impl FnOnce(&str) -> String,
) -> Result<&'e str> {
    env.read_file(target).map_err(|e| match e.kind() {
        ErrorKind::NotFound => BitosError::usage(missing(target)),
        _ => e.in_command(&env.program),
    })
}

/// Parse `-n N`, `-nN` and `-N` line counts; the rest are file names.
fn parse_count<'a>(args: &[&'a str], program: &str) -> Result<(usize, Vec<&'a str>)> {
    let invalid = |value: &str| {
        BitosError::usage(format!("{program}: invalid number of lines: '{value}'"))
    };
    let mut count = 10;
    let mut files = Vec::new();
    let mut iter = args.iter().copied();
    while let Some(arg) = iter.next() {
        let value = match arg {
            "-n" => iter
                .next()
                .ok_or_else(|| BitosError::usage(format!("{program}: option requires an argument -- 'n'")))?,
            "-f" | "--follow" => continue,
            _ if arg.starts_with("-n") => &arg[2..],
            _ if arg.len() > 1 && arg.starts_with('-') => &arg[1..],
            _ => {
                files.push(arg);
                continue;
            },
        };
        count = value.parse().map_err(|_| invalid(value))?;
    }
    Ok((count, files))
}

// ---------------------------------------------------------------------------
// head / tail
// ---------------------------------------------------------------------------

fn head_or_tail(args: &[&str], env: &Environment<'_>, program: &str, from_end: bool) -> Result<CommandOutput> {
    if args.is_empty() {
        return Err(BitosError::usage(format!("Usage: {program} [options] [file]...")));
    }
    let (count, files) = parse_count(args, program)?;
    if files.is_empty() {
        return Err(BitosError::usage(format!("{program}: no input file specified")));
    }
    let mut sections = Vec::with_capacity(files.len());
    for &file in &files {
        let text = read_or(env, file, |f| {
            format!("{program}: cannot open '{f}' for reading: No such file or directory")
        })?;
        let lines: Vec<&str> = text.lines().collect();
        let picked = if from_end {
            &lines[lines.len().saturating_sub(count)..]
        } else {
            &lines[..count.min(lines.len())]
        };
        let body = picked.join("\n");
        if files.len() > 1 {
            sections.push(format!("==> {file} <==\n{body}"));
        } else {
            sections.push(body);
        }
    }
    Ok(CommandOutput::Text(sections.join("\n\n")))
}

struct HeadCmd;
impl Command for HeadCmd {
    fn name(&self) -> &str {
        "head"
    }
    fn description(&self) -> &str {
        "Output the first part of files"
    }
    fn usage(&self) -> &str {
        "head [-n N] <file...>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        head_or_tail(args, env, "head", false)
    }
}

struct TailCmd;
impl Command for TailCmd {
    fn name(&self) -> &str {
        "tail"
    }
    fn description(&self) -> &str {
        "Output the last part of files"
    }
    fn usage(&self) -> &str {
        "tail [-n N] [-f] <file...>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        head_or_tail(args, env, "tail", true)
    }
}

// ---------------------------------------------------------------------------
// sort
// ---------------------------------------------------------------------------

fn leading_number(line: &str) -> f64 {
    line.split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0)
}

struct SortCmd;
impl Command for SortCmd {
    fn name(&self) -> &str {
        "sort"
    }
    fn description(&self) -> &str {
        "Sort lines of text files"
    }
    fn usage(&self) -> &str {
        "sort [-r] [-n] [-u] <file>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(BitosError::usage("Usage: sort [options] [file]..."));
        }
        let (flags, files) = split_flags(args);
        if let Some(bad) = flags.iter().find(|f| !matches!(**f, 'r' | 'n' | 'u' | 'f')) {
            return Err(BitosError::usage(format!("sort: invalid option -- '{bad}'")));
        }
        let mut lines = Vec::new();
        for &file in &files {
            let text = read_or(env, file, |f| format!("sort: cannot read: {f}: No such file or directory"))?;
            lines.extend(text.lines());
        }
        if flags.contains(&'n') {
            lines.sort_by(|a, b| leading_number(a).total_cmp(&leading_number(b)));
        } else if flags.contains(&'f') {
            lines.sort_by_key(|l| l.to_lowercase());
        } else {
            lines.sort();
        }
        if flags.contains(&'u') {
            lines.dedup();
        }
        if flags.contains(&'r') {
            lines.reverse();
        }
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// uniq
// ---------------------------------------------------------------------------

struct UniqCmd;
impl Command for UniqCmd {
    fn name(&self) -> &str {
        "uniq"
    }
    fn description(&self) -> &str {
        "Report or omit repeated lines"
    }
    fn usage(&self) -> &str {
        "uniq [-c] [-d] [-u] <file>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(BitosError::usage("Usage: uniq [options] [input [output]]"));
        }
        let (flags, files) = split_flags(args);
        let Some(&file) = files.first() else {
            return Err(BitosError::usage("Usage: uniq [options] [input [output]]"));
        };
        let text = read_or(env, file, |f| format!("uniq: cannot read: {f}: No such file or directory"))?;

        let lines: Vec<&str> = text.lines().collect();
        let out: Vec<String> = lines
            .chunk_by(|a, b| a == b)
            .map(|run| (run.len(), run[0]))
            .filter(|(count, _)| !flags.contains(&'d') || *count > 1)
            .filter(|(count, _)| !flags.contains(&'u') || *count == 1)
            .map(|(count, line)| {
                if flags.contains(&'c') {
                    format!("{count:>7} {line}")
                } else {
                    line.to_string()
                }
            })
            .collect();
        Ok(CommandOutput::Text(out.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// wc
// ---------------------------------------------------------------------------

struct WcCmd;
impl Command for WcCmd {
    fn name(&self) -> &str {
        "wc"
    }
    fn description(&self) -> &str {
        "Print line, word, and byte counts"
    }
    fn usage(&self) -> &str {
        "wc [-l] [-w] [-c] <file...>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(BitosError::usage("Usage: wc [options] [file]..."));
        }
        let (mut flags, files) = split_flags(args);
        if files.is_empty() {
            return Err(BitosError::usage("Usage: wc [options] [file]..."));
        }
        if flags.is_empty() {
            flags = vec!['l', 'w', 'c'];
        }

        let mut rows: Vec<(Vec<usize>, String)> = Vec::new();
        let mut totals = [0usize; 3];
        for &file in &files {
            let text = read_or(env, file, |f| format!("wc: {f}: No such file or directory"))?;
            let counts = [
                text.lines().count(),
                text.split_whitespace().count(),
                text.len(),
            ];
            for (total, n) in totals.iter_mut().zip(counts) {
                *total += n;
            }
            rows.push((select_counts(&flags, counts), file.to_string()));
        }
        if files.len() > 1 {
            rows.push((select_counts(&flags, totals), "total".to_string()));
        }

        let width = rows
            .iter()
            .flat_map(|(counts, _)| counts.iter())
            .map(|n| n.to_string().len())
            .max()
            .unwrap_or(1);
        let lines: Vec<String> = rows
            .iter()
            .map(|(counts, name)| {
                let cols: Vec<String> = counts.iter().map(|n| format!("{n:>width$}")).collect();
                format!("{} {name}", cols.join(" "))
            })
            .collect();
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

/// Lines, words, bytes in that order, filtered by the requested flags.
fn select_counts(flags: &[char], counts: [usize; 3]) -> Vec<usize> {
    ['l', 'w', 'c']
        .iter()
        .zip(counts)
        .filter(|(flag, _)| flags.contains(flag))
        .map(|(_, n)| n)
        .collect()
}

// ---------------------------------------------------------------------------
// cut
// ---------------------------------------------------------------------------

/// Parse a field list like `1,3`, `2-4` or `3-` into inclusive 1-based
/// ranges.
fn parse_field_list(spec: &str) -> Result<Vec<(usize, usize)>> {
    let bad = || BitosError::usage(format!("cut: invalid field value '{spec}'"));
    let number = |s: &str| s.parse::<usize>().map_err(|_| bad());
    let mut ranges = Vec::new();
    for part in spec.split(',') {
        let range = match part.split_once('-') {
            Some(("", "")) => return Err(bad()),
            Some((start, end)) => {
                let start = if start.is_empty() { 1 } else { number(start)? };
                let end = if end.is_empty() { usize::MAX } else { number(end)? };
                (start, end)
            },
            None => {
                let field = number(part)?;
                (field, field)
            },
        };
        if range.0 == 0 {
            return Err(BitosError::usage("cut: fields are numbered from 1"));
        }
        if range.0 > range.1 {
            return Err(BitosError::usage("cut: invalid decreasing range"));
        }
        ranges.push(range);
    }
    Ok(ranges)
}

fn field_selected(ranges: &[(usize, usize)], field: usize) -> bool {
    ranges.iter().any(|&(start, end)| (start..=end).contains(&field))
}

struct CutCmd;
impl Command for CutCmd {
    fn name(&self) -> &str {
        "cut"
    }
    fn description(&self) -> &str {
        "Remove sections from each line of files"
    }
    fn usage(&self) -> &str {
        "cut -d <delim> -f <fields> <file>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(BitosError::usage("Usage: cut [options] [file]..."));
        }
        let mut delim = "\t";
        let mut fields = None;
        let mut file = None;
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            match arg {
                "-d" => delim = iter.next().unwrap_or("\t"),
                "-f" => fields = iter.next(),
                _ if arg.starts_with("-d") => delim = &arg[2..],
                _ if arg.starts_with("-f") => fields = Some(&arg[2..]),
                _ => file = Some(arg),
            }
        }
        let Some(spec) = fields else {
            return Err(BitosError::usage(
                "cut: you must specify a list of bytes, characters, or fields",
            ));
        };
        let fields = parse_field_list(spec)?;
        let Some(file) = file else {
            return Err(BitosError::usage("Usage: cut [options] [file]..."));
        };
        let text = read_or(env, file, |f| format!("cut: {f}: No such file or directory"))?;

        let out: Vec<String> = text
            .lines()
            .map(|line| {
                if !line.contains(delim) {
                    return line.to_string();
                }
                line.split(delim)
                    .enumerate()
                    .filter(|(i, _)| field_selected(&fields, i + 1))
                    .map(|(_, part)| part)
                    .collect::<Vec<_>>()
                    .join(delim)
            })
            .collect();
        Ok(CommandOutput::Text(out.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// sed
// ---------------------------------------------------------------------------

/// A parsed `s/pattern/replacement/flags` expression.
struct Substitution {
    pattern: String,
    replacement: String,
    global: bool,
}

fn parse_substitution(script: &str) -> Result<Substitution> {
    let mut chars = script.chars();
    match chars.next() {
        Some('s') => {},
        Some(other) => {
            return Err(BitosError::usage(format!(
                "sed: -e expression #1, char 1: unknown command: `{other}'"
            )));
        },
        None => return Err(BitosError::usage("sed: -e expression #1, char 0: no previous regular expression")),
    }
    let unterminated = || {
        BitosError::usage(format!(
            "sed: -e expression #1, char {}: unterminated `s' command",
            script.chars().count()
        ))
    };
    let delim = chars.next().ok_or_else(unterminated)?;
    let parts: Vec<&str> = chars.as_str().split(delim).collect();
    let [pattern, replacement, flags] = parts.as_slice() else {
        return Err(unterminated());
    };
    if pattern.is_empty() {
        return Err(BitosError::usage("sed: -e expression #1, char 0: no previous regular expression"));
    }
    if let Some(bad) = flags.chars().find(|c| *c != 'g') {
        return Err(BitosError::usage(format!(
            "sed: -e expression #1, char {}: unknown option to `s'",
            script.chars().count() - flags.chars().count() + flags.find(bad).unwrap_or(0) + 1
        )));
    }
    Ok(Substitution {
        pattern: (*pattern).to_string(),
        replacement: (*replacement).to_string(),
        global: flags.contains('g'),
    })
}

impl Substitution {
    fn apply(&self, line: &str) -> String {
        if self.global {
            line.replace(&self.pattern, &self.replacement)
        } else {
            line.replacen(&self.pattern, &self.replacement, 1)
        }
    }
}

struct SedCmd;
impl Command for SedCmd {
    fn name(&self) -> &str {
        "sed"
    }
    fn description(&self) -> &str {
        "Stream editor for filtering and transforming text"
    }
    fn usage(&self) -> &str {
        "sed 's/pattern/replacement/[g]' <file>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn manual(&self) -> Option<&str> {
        Some(
            "NAME\n    sed - stream editor for filtering and transforming text\n\nSYNOPSIS\n    sed [-e] 's/PATTERN/REPLACEMENT/[g]' FILE...\n\nDESCRIPTION\n    Replace the first occurrence of PATTERN on each line with\n    REPLACEMENT, or every occurrence with the g flag. PATTERN is\n    matched literally.",
        )
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let args = match args {
            ["-e", rest @ ..] => rest,
            _ => args,
        };
        if args.len() < 2 {
            return Err(BitosError::usage("Usage: sed [options] {script} [input-file]..."));
        }
        let Some((script, files)) = take_quoted(args) else {
            return Err(BitosError::usage("Usage: sed [options] {script} [input-file]..."));
        };
        let substitution = parse_substitution(&script)?;
        let mut out = Vec::new();
        for &file in files {
            let text = read_or(env, file, |f| format!("sed: can't read {f}: No such file or directory"))?;
            out.extend(text.lines().map(|line| substitution.apply(line)));
        }
        Ok(CommandOutput::Text(out.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// awk
// ---------------------------------------------------------------------------

/// One item of a `print` statement.
enum PrintItem {
    Field(usize),
    LastField,
    Literal(String),
}

fn parse_awk_program(program: &str) -> Result<Vec<PrintItem>> {
    let syntax_error = || {
        BitosError::usage(format!(
            "awk: cmd. line:1: {program}\nawk: cmd. line:1: ^ syntax error"
        ))
    };
    let body = program
        .trim()
        .strip_prefix('{')
        .and_then(|p| p.strip_suffix('}'))
        .ok_or_else(syntax_error)?
        .trim();
    let list = body.strip_prefix("print").ok_or_else(syntax_error)?.trim();
    if list.is_empty() {
        return Ok(vec![PrintItem::Field(0)]);
    }
    list.split(',')
        .map(|item| {
            let item = item.trim();
            if item == "$NF" {
                Ok(PrintItem::LastField)
            } else if let Some(n) = item.strip_prefix('$') {
                n.parse().map(PrintItem::Field).map_err(|_| syntax_error())
            } else if let Some(text) = item.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
                Ok(PrintItem::Literal(text.to_string()))
            } else {
                Err(syntax_error())
            }
        })
        .collect()
}

struct AwkCmd;
impl Command for AwkCmd {
    fn name(&self) -> &str {
        "awk"
    }
    fn description(&self) -> &str {
        "Pattern scanning and processing language"
    }
    fn usage(&self) -> &str {
        "awk [-F sep] '{print $N[, $M...]}' <file>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (separator, args) = match args {
            ["-F", sep, rest @ ..] => (Some(*sep), rest),
            [first, rest @ ..] if first.starts_with("-F") && first.len() > 2 => (Some(&first[2..]), rest),
            _ => (None, args),
        };
        let separator = separator.map(|s| s.trim_matches(|c: char| c == '\'' || c == '"'));
        let usage = || BitosError::usage("Usage: awk [options] 'program' file ...");
        let (program, files) = take_quoted(args).ok_or_else(usage)?;
        if files.is_empty() {
            return Err(usage());
        }
        let items = parse_awk_program(&program)?;

        let mut out = Vec::new();
        for &file in files {
            let text = read_or(env, file, |f| format!("awk: cannot open {f} (No such file or directory)"))?;
            for line in text.lines() {
                let fields: Vec<&str> = match separator {
                    Some(sep) if !sep.is_empty() => line.split(sep).collect(),
                    _ => line.split_whitespace().collect(),
                };
                let printed: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        PrintItem::Field(0) => line.to_string(),
                        PrintItem::Field(n) => fields.get(n - 1).copied().unwrap_or("").to_string(),
                        PrintItem::LastField => fields.last().copied().unwrap_or("").to_string(),
                        PrintItem::Literal(text) => text.clone(),
                    })
                    .collect();
                out.push(printed.join(" "));
            }
        }
        Ok(CommandOutput::Text(out.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

/// `n` or `start,end` in 1-based line numbers for the half-open `start..end`.
fn line_range(start: usize, end: usize) -> String {
    if end - start == 1 {
        format!("{}", start + 1)
    } else {
        format!("{},{end}", start + 1)
    }
}

/// Normal-format diff over the longest common subsequence of lines.
fn normal_diff(a: &[&str], b: &[&str]) -> Vec<String> {
    let (n, m) = (a.len(), b.len());
    // lcs[i][j] = LCS length of a[i..] and b[j..]
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n || j < m {
        if i < n && j < m && a[i] == b[j] {
            i += 1;
            j += 1;
            continue;
        }
        let (start_i, start_j) = (i, j);
        while (i < n || j < m) && !(i < n && j < m && a[i] == b[j]) {
            if j >= m || (i < n && lcs[i + 1][j] >= lcs[i][j + 1]) {
                i += 1;
            } else {
                j += 1;
            }
        }
        let removed = &a[start_i..i];
        let added = &b[start_j..j];
        let header = match (removed.is_empty(), added.is_empty()) {
            (false, false) => format!("{}c{}", line_range(start_i, i), line_range(start_j, j)),
            (false, true) => format!("{}d{start_j}", line_range(start_i, i)),
            _ => format!("{start_i}a{}", line_range(start_j, j)),
        };
        out.push(header);
        out.extend(removed.iter().map(|l| format!("< {l}")));
        if !removed.is_empty() && !added.is_empty() {
            out.push("---".to_string());
        }
        out.extend(added.iter().map(|l| format!("> {l}")));
    }
    out
}

struct DiffCmd;
impl Command for DiffCmd {
    fn name(&self) -> &str {
        "diff"
    }
    fn description(&self) -> &str {
        "Compare files line by line"
    }
    fn usage(&self) -> &str {
        "diff [-q] <file1> <file2>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (flags, files) = split_flags(args);
        let &[left, right] = files.as_slice() else {
            return Err(BitosError::usage("Usage: diff [options] from-file to-file"));
        };
        let missing = |f: &str| format!("diff: {f}: No such file or directory");
        let (a, b) = match (read_or(env, left, missing), read_or(env, right, missing)) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => return Err(e),
            (Err(_), Err(_)) => {
                return Err(BitosError::usage(format!("{}\n{}", missing(left), missing(right))));
            },
        };
        let a: Vec<&str> = a.lines().collect();
        let b: Vec<&str> = b.lines().collect();
        if a == b {
            return Ok(CommandOutput::None);
        }
        if flags.contains(&'q') {
            return Ok(CommandOutput::Text(format!("Files {left} and {right} differ")));
        }
        Ok(CommandOutput::Text(normal_diff(&a, &b).join("\n")))
    }
}

// ---------------------------------------------------------------------------
// less / more
// ---------------------------------------------------------------------------

struct LessCmd;
impl Command for LessCmd {
    fn name(&self) -> &str {
        "less"
    }
    fn aliases(&self) -> &[&str] {
        &["more"]
    }
    fn description(&self) -> &str {
        "View file contents"
    }
    fn usage(&self) -> &str {
        "less <file>"
    }
    fn category(&self) -> &str {
        "utility"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(&file) = args.iter().find(|a| !a.starts_with('-')) else {
            return Err(BitosError::usage("Missing filename"));
        };
        // less reports problems without a program prefix.
        match env.read_file(file) {
            Ok(text) => Ok(CommandOutput::Text(text.to_string())),
            Err(e) if e.kind() == ErrorKind::NotSupported => {
                Err(BitosError::usage(format!("{file} is a directory")))
            },
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    const FRUITS: &str = "banana\napple\ncherry\napple\napple\nbanana";
    const PEOPLE: &str = "name,age,city\nann,31,oslo\nbob,27,rome";

    fn fixture() -> Fixture {
        let mut fx = Fixture::new();
        fx.vfs
            .create_or_overwrite_file(&fx.cwd, "fruits.txt", FRUITS)
            .unwrap();
        fx.vfs
            .create_or_overwrite_file(&fx.cwd, "people.csv", PEOPLE)
            .unwrap();
        fx.vfs
            .create_or_overwrite_file(&fx.cwd, "a.txt", "one\ntwo\nthree")
            .unwrap();
        fx.vfs
            .create_or_overwrite_file(&fx.cwd, "b.txt", "one\n2\nthree\nfour")
            .unwrap();
        fx
    }

    fn run(fx: &mut Fixture, line: &str) -> String {
        let mut reg = CommandRegistry::new();
        register_text_commands(&mut reg);
        match reg.execute(line, &mut fx.env()) {
            Ok(out) => out.render(),
            Err(e) => e.to_string(),
        }
    }

    #[test]
    fn head_and_tail_counts() {
        let mut fx = fixture();
        assert_eq!(run(&mut fx, "head -n 2 fruits.txt"), "banana\napple");
        assert_eq!(run(&mut fx, "head -3 fruits.txt"), "banana\napple\ncherry");
        assert_eq!(run(&mut fx, "head fruits.txt"), FRUITS);
        assert_eq!(run(&mut fx, "tail -n 2 fruits.txt"), "apple\nbanana");
        assert_eq!(run(&mut fx, "tail -n1 /etc/hosts"), "::1 localhost");
        assert_eq!(
            run(&mut fx, "head -n 1 a.txt b.txt"),
            "==> a.txt <==\none\n\n==> b.txt <==\none"
        );
    }

    #[test]
    fn head_and_tail_errors() {
        let mut fx = fixture();
        assert_eq!(run(&mut fx, "head"), "Usage: head [options] [file]...");
        assert_eq!(run(&mut fx, "tail -n 3"), "tail: no input file specified");
        assert_eq!(
            run(&mut fx, "head missing.txt"),
            "head: cannot open 'missing.txt' for reading: No such file or directory"
        );
        assert_eq!(
            run(&mut fx, "head -n x fruits.txt"),
            "head: invalid number of lines: 'x'"
        );
        assert_eq!(run(&mut fx, "tail documents"), "tail: documents: Is a directory");
    }

    #[test]
    fn sort_variants() {
        let mut fx = fixture();
        assert_eq!(
            run(&mut fx, "sort fruits.txt"),
            "apple\napple\napple\nbanana\nbanana\ncherry"
        );
        assert_eq!(run(&mut fx, "sort -u fruits.txt"), "apple\nbanana\ncherry");
        assert_eq!(
            run(&mut fx, "sort -r fruits.txt"),
            "cherry\nbanana\nbanana\napple\napple\napple"
        );
        fx.vfs
            .create_or_overwrite_file(&fx.cwd, "nums.txt", "10\n2\n1\n20")
            .unwrap();
        assert_eq!(run(&mut fx, "sort -n nums.txt"), "1\n2\n10\n20");
        assert_eq!(
            run(&mut fx, "sort nope.txt"),
            "sort: cannot read: nope.txt: No such file or directory"
        );
    }

    #[test]
    fn uniq_collapses_adjacent_lines() {
        let mut fx = fixture();
        assert_eq!(
            run(&mut fx, "uniq fruits.txt"),
            "banana\napple\ncherry\napple\nbanana"
        );
        assert_eq!(
            run(&mut fx, "uniq -c fruits.txt"),
            "      1 banana\n      1 apple\n      1 cherry\n      2 apple\n      1 banana"
        );
        assert_eq!(run(&mut fx, "uniq -d fruits.txt"), "apple");
        assert_eq!(
            run(&mut fx, "uniq nope.txt"),
            "uniq: cannot read: nope.txt: No such file or directory"
        );
    }

    #[test]
    fn wc_counts() {
        let mut fx = fixture();
        assert_eq!(run(&mut fx, "wc fruits.txt"), " 6  6 38 fruits.txt");
        assert_eq!(run(&mut fx, "wc -l fruits.txt"), "6 fruits.txt");
        assert_eq!(run(&mut fx, "wc -c fruits.txt"), "38 fruits.txt");
        assert_eq!(
            run(&mut fx, "wc -l a.txt b.txt"),
            "3 a.txt\n4 b.txt\n7 total"
        );
        assert_eq!(run(&mut fx, "wc nope.txt"), "wc: nope.txt: No such file or directory");
        assert_eq!(run(&mut fx, "wc"), "Usage: wc [options] [file]...");
    }

    #[test]
    fn cut_fields() {
        let mut fx = fixture();
        assert_eq!(
            run(&mut fx, "cut -d , -f 1,3 people.csv"),
            "name,city\nann,oslo\nbob,rome"
        );
        assert_eq!(run(&mut fx, "cut -d, -f2 people.csv"), "age\n31\n27");
        assert_eq!(
            run(&mut fx, "cut people.csv"),
            "cut: you must specify a list of bytes, characters, or fields"
        );
        assert_eq!(
            run(&mut fx, "cut -d , -f 1 nope.csv"),
            "cut: nope.csv: No such file or directory"
        );
    }

    #[test]
    fn cut_ranges_stay_bounded() {
        let mut fx = fixture();
        assert_eq!(
            run(&mut fx, "cut -d , -f 1-18446744073709551615 people.csv"),
            run(&mut fx, "cut -d , -f 1-3 people.csv")
        );
        assert_eq!(run(&mut fx, "cut -d , -f 2- people.csv"), "age,city\n31,oslo\n27,rome");
        assert_eq!(run(&mut fx, "cut -d , -f -1 people.csv"), "name\nann\nbob");
        assert_eq!(run(&mut fx, "cut -d , -f 3-1 people.csv"), "cut: invalid decreasing range");
        assert_eq!(run(&mut fx, "cut -d , -f 0 people.csv"), "cut: fields are numbered from 1");
        assert_eq!(
            run(&mut fx, "cut -d , -f 1-99999999999999999999 people.csv"),
            "cut: invalid field value '1-99999999999999999999'"
        );
    }

    #[test]
    fn field_list_parsing() {
        assert_eq!(parse_field_list("1,3").unwrap(), vec![(1, 1), (3, 3)]);
        assert_eq!(parse_field_list("2-").unwrap(), vec![(2, usize::MAX)]);
        assert!(parse_field_list("-").is_err());
        assert!(parse_field_list("a").is_err());
        assert!(field_selected(&[(2, usize::MAX)], 1_000_000));
        assert!(!field_selected(&[(2, 4)], 1));
    }

    #[test]
    fn sed_substitutes() {
        let mut fx = fixture();
        assert_eq!(
            run(&mut fx, "sed s/apple/pear/ fruits.txt"),
            "banana\npear\ncherry\npear\npear\nbanana"
        );
        assert_eq!(
            run(&mut fx, "sed 's/an/AN/g' fruits.txt"),
            "bANANa\napple\ncherry\napple\napple\nbANANa"
        );
        assert_eq!(run(&mut fx, "sed s|one|1| a.txt"), "1\ntwo\nthree");
        assert_eq!(
            run(&mut fx, "sed x fruits.txt"),
            "sed: -e expression #1, char 1: unknown command: `x'"
        );
        assert_eq!(
            run(&mut fx, "sed s/a/b fruits.txt"),
            "sed: -e expression #1, char 5: unterminated `s' command"
        );
        assert_eq!(
            run(&mut fx, "sed s/a/b/ nope.txt"),
            "sed: can't read nope.txt: No such file or directory"
        );
        assert_eq!(run(&mut fx, "sed s/a/b/"), "Usage: sed [options] {script} [input-file]...");
    }

    #[test]
    fn awk_prints_fields() {
        let mut fx = fixture();
        assert_eq!(run(&mut fx, "awk '{print $2}' /etc/hosts"), "localhost\nlocalhost");
        assert_eq!(
            run(&mut fx, "awk '{print $1, $2}' /etc/resolv.conf"),
            "nameserver 8.8.8.8\nnameserver 8.8.4.4"
        );
        assert_eq!(run(&mut fx, "awk -F, '{print $1}' people.csv"), "name\nann\nbob");
        assert_eq!(run(&mut fx, "awk -F , {print$NF} people.csv"), "city\noslo\nrome");
        assert_eq!(run(&mut fx, "awk '{print}' a.txt"), "one\ntwo\nthree");
        assert_eq!(
            run(&mut fx, "awk '{print $1}' nope.txt"),
            "awk: cannot open nope.txt (No such file or directory)"
        );
        assert!(run(&mut fx, "awk '{exit}' a.txt").ends_with("^ syntax error"));
        assert_eq!(run(&mut fx, "awk"), "Usage: awk [options] 'program' file ...");
    }

    #[test]
    fn diff_normal_format() {
        let mut fx = fixture();
        assert_eq!(
            run(&mut fx, "diff a.txt b.txt"),
            "2c2\n< two\n---\n> 2\n3a4\n> four"
        );
        assert_eq!(run(&mut fx, "diff b.txt a.txt"), "2c2\n< 2\n---\n> two\n4d3\n< four");
        assert_eq!(run(&mut fx, "diff a.txt a.txt"), "");
        assert_eq!(run(&mut fx, "diff -q a.txt b.txt"), "Files a.txt and b.txt differ");
        assert_eq!(
            run(&mut fx, "diff a.txt nope.txt"),
            "diff: nope.txt: No such file or directory"
        );
        assert_eq!(
            run(&mut fx, "diff x y"),
            "diff: x: No such file or directory\ndiff: y: No such file or directory"
        );
        assert_eq!(run(&mut fx, "diff a.txt"), "Usage: diff [options] from-file to-file");
    }

    #[test]
    fn less_shows_files() {
        let mut fx = fixture();
        assert_eq!(
            run(&mut fx, "less documents/readme.txt"),
            "Welcome to BitOS!\nThis is a browser-based terminal simulation."
        );
        assert_eq!(run(&mut fx, "more a.txt"), "one\ntwo\nthree");
        assert_eq!(run(&mut fx, "less"), "Missing filename");
        assert_eq!(run(&mut fx, "less nope"), "nope: No such file or directory");
        assert_eq!(run(&mut fx, "less documents"), "documents is a directory");
    }
}
