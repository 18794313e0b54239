// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Editing of the running configuration of an FRR daemon, section by section.
//! A section starts at a line matching a pattern and ends at the next line
//! matching a stop pattern, which by default is the next non-indented line.

use regex_lite::Regex;
use std::fmt::Display;
use tracing::{debug, warn};

use crate::errors::FrrErr;

/// Default end of a section: any non-indented line
pub const STOP_ANY: &str = r"\S+";

/// Number of header lines of the output of `show running-config`
const SHOW_RUN_HEADER_LINES: usize = 3;

fn compile(pattern: &str, full: bool) -> Result<Regex, FrrErr> {
    let anchored = if full {
        format!("^(?:{pattern})$")
    } else {
        format!("^(?:{pattern})")
    };
    Regex::new(&anchored).map_err(|e| FrrErr::BadPattern(pattern.to_owned(), e.to_string()))
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_owned).collect()
}

/// The running configuration of a daemon, as a list of lines
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunningConfig {
    original: Vec<String>,
    lines: Vec<String>,
}

impl RunningConfig {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let lines = split_lines(text);
        Self {
            original: lines.clone(),
            lines,
        }
    }
    /// Build from the output of `show running-config`, dropping its header
    #[must_use]
    pub fn from_show_running(output: &str) -> Self {
        let lines: Vec<String> = output
            .lines()
            .skip(SHOW_RUN_HEADER_LINES)
            .map(str::to_owned)
            .collect();
        Self {
            original: lines.clone(),
            lines,
        }
    }
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
    /// The lines as loaded, before any modification
    #[must_use]
    pub fn original(&self) -> &[String] {
        &self.original
    }
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.lines != self.original
    }

    /// Find the first section at or after line `from`. Returns the index of its
    /// first line and the index of the stop line, if any.
    fn find_section(&self, start: &Regex, stop: &Regex, from: usize) -> Option<(usize, Option<usize>)> {
        let first = self.lines[from..]
            .iter()
            .position(|line| start.is_match(line))
            .map(|pos| pos + from)?;
        let end = self.lines[first + 1..]
            .iter()
            .position(|line| stop.is_match(line))
            .map(|pos| pos + first + 1);
        Some((first, end))
    }

    /// Replace the sections starting at a line matching `start` by `replacement`.
    /// A section ends before the next line matching `stop`; that line is removed
    /// too if `remove_stop_mark` is set. A section with no stop line is left
    /// untouched. At most `count` sections are replaced, all of them if `count`
    /// is 0. Returns true if some section was replaced.
    pub fn modify_section(
        &mut self,
        start: &str,
        replacement: &str,
        stop: &str,
        remove_stop_mark: bool,
        count: usize,
    ) -> Result<bool, FrrErr> {
        let start_re = compile(start, false)?;
        let stop_re = compile(stop, false)?;
        let replacement = split_lines(replacement);
        let mut replaced = 0;
        let mut next = 0;
        while (count == 0 || replaced < count) && next <= self.lines.len() {
            let Some((first, end)) = self.find_section(&start_re, &stop_re, next) else {
                break;
            };
            let last = match end {
                Some(end) if remove_stop_mark => end + 1,
                Some(end) => end,
                None => {
                    warn!("Section '{}' is not terminated: left untouched", self.lines[first]);
                    break;
                }
            };
            debug!(
                "Replacing lines {first}..{last} ('{}') with {} lines",
                self.lines[first],
                replacement.len()
            );
            self.lines.splice(first..last, replacement.iter().cloned());
            next = first + replacement.len();
            replaced += 1;
        }
        Ok(replaced > 0)
    }

    /// Remove the lines fully matching `pattern`. With `within`, only the lines
    /// of the sections starting at a line matching `within` are considered; such
    /// a section ends at the next non-indented line. Returns the number of lines
    /// removed.
    pub fn remove_lines(&mut self, pattern: &str, within: Option<&str>) -> Result<usize, FrrErr> {
        let line_re = compile(pattern, true)?;
        let within_re = within.map(|w| compile(w, false)).transpose()?;
        let stop_re = compile(STOP_ANY, false)?;
        let before = self.lines.len();
        let mut inside = within_re.is_none();
        self.lines.retain(|line| {
            if let Some(within_re) = &within_re {
                if within_re.is_match(line) {
                    inside = true;
                    return true;
                }
                if stop_re.is_match(line) {
                    inside = false;
                    return true;
                }
            }
            !(inside && line_re.is_match(line))
        });
        let removed = before - self.lines.len();
        if removed > 0 {
            debug!("Removed {removed} lines matching '{pattern}'");
        }
        Ok(removed)
    }

    /// Insert `addition` before the first line fully matching `anchor`. If no
    /// line matches, the addition is appended and false is returned.
    pub fn add_before(&mut self, anchor: &str, addition: &str) -> Result<bool, FrrErr> {
        let anchor_re = compile(anchor, true)?;
        let addition = split_lines(addition);
        match self.lines.iter().position(|line| anchor_re.is_match(line)) {
            Some(pos) => {
                self.lines.splice(pos..pos, addition);
                Ok(true)
            }
            None => {
                warn!("No line matches '{anchor}': appending {} lines", addition.len());
                self.lines.extend(addition);
                Ok(false)
            }
        }
    }
}

impl Display for RunningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RUNNING: &str = "\
frr version 10.1
frr defaults traditional
hostname r1
!
interface eth0
 ip ospf area 0
 ip ospf cost 10
exit
!
interface eth1
 ip ospf passive
exit
!
router ospf
 ospf router-id 192.0.2.1
 network 10.0.0.0/24 area 0
exit
!
router ospf vrf red
 ospf router-id 192.0.2.2
exit
!
ip prefix-list PL seq 5 permit 10.0.0.0/8
!
route-map RM permit 10
exit
!
line vty
!";

    #[test]
    fn test_remove_sections() {
        let mut running = RunningConfig::new(RUNNING);
        assert!(!running.is_modified());
        assert!(running.modify_section(r"interface \S+", "", STOP_ANY, true, 0).unwrap());
        assert!(running.modify_section("router ospf$", "", STOP_ANY, true, 0).unwrap());
        assert!(running.is_modified());
        let expected = "\
frr version 10.1
frr defaults traditional
hostname r1
!
!
!
!
router ospf vrf red
 ospf router-id 192.0.2.2
exit
!
ip prefix-list PL seq 5 permit 10.0.0.0/8
!
route-map RM permit 10
exit
!
line vty
!";
        assert_eq!(running.to_string(), expected);

        // nothing left to remove
        assert!(!running.modify_section(r"interface \S+", "", STOP_ANY, true, 0).unwrap());
    }

    #[test]
    fn test_replace_keeps_stop_mark() {
        let mut running = RunningConfig::new(RUNNING);
        let replaced = running
            .modify_section(r"router ospf vrf \S+", "router ospf vrf red\n ospf router-id 192.0.2.3", r"!", false, 0)
            .unwrap();
        assert!(replaced);
        let text = running.to_string();
        assert!(text.contains("router ospf vrf red\n ospf router-id 192.0.2.3\n!\nip prefix-list"));
        assert!(!text.contains("192.0.2.2"));
    }

    #[test]
    fn test_count_limits_replacements() {
        let mut running = RunningConfig::new(RUNNING);
        assert!(running.modify_section(r"interface \S+", "", STOP_ANY, true, 1).unwrap());
        let text = running.to_string();
        assert!(!text.contains("interface eth0"));
        assert!(text.contains("interface eth1"));
    }

    #[test]
    fn test_replacement_is_not_matched_again() {
        let mut running = RunningConfig::new("interface eth0\n ip ospf cost 1\nexit");
        let replacement = "interface eth0\n ip ospf cost 2\nexit";
        assert!(running.modify_section(r"interface \S+", replacement, STOP_ANY, true, 0).unwrap());
        assert_eq!(running.to_string(), replacement);
    }

    #[test]
    fn test_unterminated_section_is_kept() {
        let text = "router ospf\n ospf router-id 192.0.2.1\n network 10.0.0.0/24 area 0";
        let mut running = RunningConfig::new(text);
        assert!(!running.modify_section("router ospf$", "", STOP_ANY, true, 0).unwrap());
        assert!(!running.is_modified());
        assert_eq!(running.to_string(), text);

        // terminated sections before it are still replaced
        let mut running = RunningConfig::new("interface eth0\n ip ospf cost 1\nexit\ninterface eth1\n ip ospf cost 2");
        assert!(running.modify_section(r"interface \S+", "", STOP_ANY, true, 0).unwrap());
        assert_eq!(running.to_string(), "interface eth1\n ip ospf cost 2");
    }

    #[test]
    fn test_remove_lines() {
        let zebra = "\
frr version 10.1
frr defaults traditional
hostname r1
!
ip protocol ospf route-map OLD
ip protocol rip route-map KEEP
!
vrf red
 ip protocol ospf route-map RED
exit-vrf
!
vrf blue
 ip protocol ospf route-map BLUE
exit-vrf
!
line vty
!";
        let mut running = RunningConfig::new(zebra);
        assert_eq!(running.remove_lines(r"ip protocol ospf route-map \S+", None).unwrap(), 1);
        let text = running.to_string();
        assert!(!text.contains("route-map OLD"));
        assert!(text.contains("ip protocol rip route-map KEEP"));
        assert!(text.contains(" ip protocol ospf route-map RED"));

        let pattern = r" ip protocol ospf route-map \S+";
        assert_eq!(running.remove_lines(pattern, Some("vrf red$")).unwrap(), 1);
        let text = running.to_string();
        assert!(text.contains("vrf red\nexit-vrf\n"));
        assert!(text.contains(" ip protocol ospf route-map BLUE"));

        assert_eq!(running.remove_lines(pattern, Some("vrf red$")).unwrap(), 0);
    }

    #[test]
    fn test_add_before() {
        let mut running = RunningConfig::new(RUNNING);
        let anchor = r"(ip prefix-list .*|route-map .*|line vty)";
        assert!(running.add_before(anchor, "router rip\n network 10.0.0.0/8\nexit").unwrap());
        let text = running.to_string();
        assert!(text.contains("!\nrouter rip\n network 10.0.0.0/8\nexit\nip prefix-list PL"));

        // the anchor must match the whole line
        let mut running = RunningConfig::new("router ospf\nexit\n!\nline vty2");
        assert!(!running.add_before("line vty", "router rip").unwrap());
        assert_eq!(running.lines().last().map(String::as_str), Some("router rip"));
    }

    #[test]
    fn test_from_show_running() {
        let output = "Building configuration...\n\nCurrent configuration:\n!\nrouter rip\nexit\n";
        let running = RunningConfig::from_show_running(output);
        assert_eq!(running.lines(), &["!", "router rip", "exit"]);
        assert_eq!(running.original(), running.lines());
    }

    #[test]
    fn test_bad_pattern() {
        let mut running = RunningConfig::new(RUNNING);
        assert!(matches!(
            running.modify_section("(", "", STOP_ANY, false, 0),
            Err(FrrErr::BadPattern(..))
        ));
    }
}
