//! Package management commands: apt/apt-get, dpkg, apt-cache.
//!
//! Nothing is ever installed. Every operation answers from a small table
//! of packages that ship with the image, and anything else is treated as
//! a plausible package at version 1.2.3-1.

use bitos_types::error::{BitosError, Result};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment, glob_match};

/// Register package commands into a registry.
pub fn register_package_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(AptCmd));
    reg.register(Box::new(DpkgCmd));
    reg.register(Box::new(AptCacheCmd));
}

struct Package {
    name: &'static str,
    version: &'static str,
    description: &'static str,
}

const INSTALLED: &[Package] = &[
    Package {
        name: "bash",
        version: "5.2.15-2+b2",
        description: "GNU Bourne Again SHell",
    },
    Package {
        name: "coreutils",
        version: "9.1-1",
        description: "GNU core utilities",
    },
    Package {
        name: "findutils",
        version: "4.9.0-4",
        description: "utilities for finding files",
    },
    Package {
        name: "grep",
        version: "3.8-5",
        description: "GNU grep, egrep and fgrep",
    },
    Package {
        name: "gzip",
        version: "1.12-1",
        description: "GNU compression utilities",
    },
    Package {
        name: "sed",
        version: "4.9-1",
        description: "GNU stream editor for filtering/transforming text",
    },
    Package {
        name: "tar",
        version: "1.34+dfsg-1.2",
        description: "GNU version of the tar archiving utility",
    },
];

const SIMULATED_VERSION: &str = "1.2.3-1";

fn installed(name: &str) -> Option<&'static Package> {
    INSTALLED.iter().find(|p| p.name == name)
}

const READING_STATE: &str = "Reading package lists... Done
Building dependency tree... Done
Reading state information... Done";

/// First non-flag argument after the subcommand.
fn operand<'a>(rest: &[&'a str]) -> Option<&'a str> {
    rest.iter().copied().find(|a| !a.starts_with('-'))
}

fn required<'a>(rest: &[&'a str], message: &str) -> Result<&'a str> {
    operand(rest).ok_or_else(|| BitosError::usage(message))
}

fn package_record(name: &str, apt_fields: bool) -> String {
    let (version, summary) = match installed(name) {
        Some(p) => (p.version, p.description.to_string()),
        None => (SIMULATED_VERSION, format!("{name} package for Debian")),
    };
    let mut out = format!("Package: {name}\n");
    if apt_fields {
        out.push_str(&format!(
            "Version: {version}\nPriority: optional\nSection: utils\n\
             Maintainer: Debian Developers <debian-devel@lists.debian.org>\n\
             Installed-Size: 5192\n"
        ));
    } else {
        out.push_str(&format!(
            "Status: install ok installed\nPriority: optional\nSection: utils\n\
             Installed-Size: 5192\n\
             Maintainer: Debian Developers <debian-devel@lists.debian.org>\n\
             Architecture: amd64\nVersion: {version}\n"
        ));
    }
    out.push_str("Depends: libc6 (>= 2.34), libgcc-s1 (>= 3.0)\n");
    if apt_fields {
        out.push_str(
            "Homepage: https://www.debian.org/\nDownload-Size: 1564 kB\n\
             APT-Sources: http://deb.debian.org/debian bookworm/main amd64 Packages\n",
        );
    }
    out.push_str(&format!(
        "Description: {summary}\n \
         This is a simulated package description for {name}.\n .\n \
         This package provides core functionality for {name}."
    ));
    out
}

// ---------------------------------------------------------------------------
// apt / apt-get
// ---------------------------------------------------------------------------

const APT_HELP: &str = "apt 2.6.1 (amd64)
Usage: apt [options] command

apt is a commandline package manager and provides commands for
searching and managing as well as querying information about packages.
It provides the same functionality as the specialized APT tools,
like apt-get and apt-cache, but enables options more suitable for
interactive use by default.

Most used commands:
  list - list packages based on package names
  search - search in package descriptions
  show - show package details
  install - install packages
  reinstall - reinstall packages
  remove - remove packages
  autoremove - Remove automatically all unused packages
  update - update list of available packages
  upgrade - upgrade the system by installing/upgrading packages
  full-upgrade - upgrade the system by removing/installing/upgrading packages
  edit-sources - edit the source information file
  satisfy - satisfy dependency strings

See apt(8) for more information about the available commands.
Configuration options and syntax is detailed in apt.conf(5).
Information about how to configure sources can be found in sources.list(5).
Package and version choices can be expressed via apt_preferences(5).
Security details are available in apt-secure(8).
                                        This APT has Super Cow Powers.";

struct AptCmd;
impl Command for AptCmd {
    fn name(&self) -> &str {
        "apt"
    }
    fn aliases(&self) -> &[&str] {
        &["apt-get"]
    }
    fn description(&self) -> &str {
        "Package manager"
    }
    fn usage(&self) -> &str {
        "apt <update|upgrade|install|remove|search|show|list> [package]"
    }
    fn category(&self) -> &str {
        "package"
    }
    fn manual(&self) -> Option<&str> {
        Some(APT_HELP)
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some((&subcommand, rest)) = args.split_first() else {
            return Ok(CommandOutput::Text(APT_HELP.to_string()));
        };
        let text = match subcommand {
            "update" => {
                env.pause_between(300, 900);
                format!(
                    "Hit:1 http://deb.debian.org/debian bookworm InRelease\n\
                     Hit:2 http://security.debian.org/debian-security bookworm-security InRelease\n\
                     Hit:3 http://deb.debian.org/debian bookworm-updates InRelease\n\
                     {READING_STATE}\nAll packages are up to date."
                )
            },
            "upgrade" | "full-upgrade" => format!(
                "{READING_STATE}\nCalculating upgrade... Done\n\
                 0 upgraded, 0 newly installed, 0 to remove and 0 not upgraded."
            ),
            "install" | "reinstall" => {
                let name = required(rest, "E: No package name specified")?;
                if let Some(p) = installed(name)
                    && subcommand == "install"
                {
                    return Ok(CommandOutput::Text(format!(
                        "{READING_STATE}\n{name} is already the newest version ({}).\n\
                         0 upgraded, 0 newly installed, 0 to remove and 0 not upgraded.",
                        p.version
                    )));
                }
                env.pause_between(400, 1000);
                let assume_yes = rest.iter().any(|a| matches!(*a, "-y" | "--yes" | "--assume-yes"));
                install_transcript(name, assume_yes)
            },
            "remove" | "purge" => {
                let name = required(rest, "E: No package name specified")?;
                format!(
                    "{READING_STATE}\nThe following packages will be REMOVED:\n  {name}\n\
                     0 upgraded, 0 newly installed, 1 to remove and 0 not upgraded.\n\
                     After this operation, 5,192 kB disk space will be freed.\n\
                     Do you want to continue? [Y/n] y\n\
                     (Reading database ... 132517 files and directories currently installed.)\n\
                     Removing {name} ({SIMULATED_VERSION}) ...\n\
                     Processing triggers for man-db (2.11.2-2) ..."
                )
            },
            "autoremove" => format!(
                "{READING_STATE}\n0 upgraded, 0 newly installed, 0 to remove and 0 not upgraded."
            ),
            "search" => {
                let term = required(rest, "E: No search term specified")?;
                format!(
                    "Sorting... Done\nFull Text Search... Done\n\
                     {term}base/stable 1.2.3-1 amd64\n  {term} base package\n\n\
                     lib{term}/stable 2.3.4-1 amd64\n  {term} library package\n\n\
                     {term}-utils/stable 3.4.5-1 amd64\n  {term} utilities package"
                )
            },
            "show" => {
                let name = required(rest, "E: No package name specified")?;
                package_record(name, true)
            },
            "list" => {
                let mut out = String::from("Listing... Done");
                for p in INSTALLED {
                    out.push_str(&format!(
                        "\n{}/stable,now {} amd64 [installed]",
                        p.name, p.version
                    ));
                }
                out
            },
            other => return Err(BitosError::usage(format!("E: Invalid operation {other}"))),
        };
        Ok(CommandOutput::Text(text))
    }
}

fn install_transcript(name: &str, assume_yes: bool) -> String {
    let prompt = if assume_yes { "" } else { "Do you want to continue? [Y/n] y\n" };
    format!(
        "{READING_STATE}\nThe following NEW packages will be installed:\n  {name}\n\
         0 upgraded, 1 newly installed, 0 to remove and 0 not upgraded.\n\
         Need to get 1,564 kB of archives.\n\
         After this operation, 5,192 kB of additional disk space will be used.\n\
         {prompt}\
         Get:1 http://deb.debian.org/debian bookworm/main amd64 {name} amd64 {SIMULATED_VERSION} [1,564 kB]\n\
         Fetched 1,564 kB in 0s (3,128 kB/s)\n\
         Selecting previously unselected package {name}.\n\
         (Reading database ... 132517 files and directories currently installed.)\n\
         Preparing to unpack .../archives/{name}_{SIMULATED_VERSION}_amd64.deb ...\n\
         Unpacking {name} ({SIMULATED_VERSION}) ...\n\
         Setting up {name} ({SIMULATED_VERSION}) ...\n\
         Processing triggers for man-db (2.11.2-2) ..."
    )
}

// ---------------------------------------------------------------------------
// dpkg
// ---------------------------------------------------------------------------

const DPKG_HELP: &str = "dpkg 1.21.22 (amd64)
Usage: dpkg [options] command

Commands:
  -i|--install       <.deb file>... | -R|--recursive <directory>...
  --unpack           <.deb file>... | -R|--recursive <directory>...
  -A|--record-avail  <.deb file>... | -R|--recursive <directory>...
  --configure        <package>... | -a|--pending
  --triggers-only    <package>... | -a|--pending
  -r|--remove        <package>... | -a|--pending
  -P|--purge         <package>... | -a|--pending
  -V|--verify [<package>...]       Verify the integrity of package(s).
  --get-selections [<pattern>...]  Get list of selections to stdout.
  --set-selections                 Set package selections from stdin.
  --clear-selections               Deselect every non-essential package.
  --update-avail [<Packages-file>] Replace available packages info.
  --merge-avail [<Packages-file>]  Merge with info from file.
  --clear-avail                    Erase existing available info.
  --forget-old-unavail             Forget uninstalled unavailable pkgs.
  -s|--status [<package>...]       Display package status details.
  -p|--print-avail [<package>...]  Display available version details.
  -L|--listfiles <package>...      List files 'owned' by package(s).
  -l|--list [<pattern>...]         List packages concisely.
  -S|--search <pattern>...         Find package(s) owning file(s).
  -C|--audit [<package>...]        Check for broken package(s).
  --yet-to-unpack                  Print packages selected for installation.
  --predep-package                 Print pre-dependencies to unpack.
  --add-architecture <arch>        Add <arch> to the list of architectures.
  --remove-architecture <arch>     Remove <arch> from the list of architectures.
  --print-architecture             Print dpkg architecture.
  --print-foreign-architectures    Print allowed foreign architectures.
  --assert-help                    Display this help message.
  --assert-support-predepends      Display support for Pre-Depends field.
  --assert-working-epoch           Display support for epochs in versions.
  --assert-long-filenames          Display support for long filenames in archives.
  --assert-multi-conrep            Display support for multiple C/R/P in archives.
  --assert-multi-arch              Display support for multiple architectures.
  --assert-versioned-provides      Display support for versioned provides.
  --assert-triggers                Display support for triggers.
  --no-assert-<feature>            Disable assertion of <feature>.
  --compare-versions <a> <op> <b>  Compare version numbers - see below.
  --force-help                     Show help on forcing.
  -Dh|--debug=help                 Show help on debugging.

  -?, --help                       Show this help message.
      --version                    Show the version.

Comparison operators for --compare-versions are:
  lt le eq ne ge gt       (treat empty version as earlier than any version);
  lt-nl le-nl ge-nl gt-nl (treat empty version as later than any version);
  < << <= = >= >> >       (only for compatibility with control file syntax).

Use 'apt' or 'aptitude' for user-friendly package management.";

const DPKG_NO_ACTION: &str = "dpkg: error: need an action option

Type dpkg --help for help about installing and deinstalling packages [*];
Use 'apt' or 'aptitude' for user-friendly package management;
Type dpkg -Dhelp for a list of dpkg debug flag values;
Type dpkg --force-help for a list of forcing options;
Type dpkg-deb --help for help about manipulating *.deb files;";

const DPKG_LIST_HEADER: &str = "Desired=Unknown/Install/Remove/Purge/Hold
| Status=Not/Inst/Conf-files/Unpacked/halF-conf/Half-inst/trig-aWait/Trig-pend
|/ Err?=(none)/Reinst-required (Status,Err: uppercase=bad)
||/ Name                Version                 Architecture Description
+++-===================-=======================-============-===============================";

struct DpkgCmd;
impl Command for DpkgCmd {
    fn name(&self) -> &str {
        "dpkg"
    }
    fn description(&self) -> &str {
        "Debian package manager"
    }
    fn usage(&self) -> &str {
        "dpkg <-l|-s|-L|-S> [package]"
    }
    fn category(&self) -> &str {
        "package"
    }
    fn manual(&self) -> Option<&str> {
        Some(DPKG_HELP)
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some((&option, rest)) = args.split_first() else {
            return Ok(CommandOutput::Text(DPKG_HELP.to_string()));
        };
        let text = match option {
            "-l" | "--list" => {
                let pattern = rest.first().copied();
                let mut out = DPKG_LIST_HEADER.to_string();
                for p in INSTALLED
                    .iter()
                    .filter(|p| pattern.is_none_or(|pat| glob_match(pat, p.name)))
                {
                    out.push_str(&format!(
                        "\nii  {:<19} {:<23} amd64        {}",
                        p.name, p.version, p.description
                    ));
                }
                out
            },
            "-s" | "--status" => {
                let name = rest
                    .first()
                    .ok_or_else(|| BitosError::usage("dpkg-query: no packages found matching"))?;
                package_record(name, false)
            },
            "-L" | "--listfiles" => {
                let name = rest
                    .first()
                    .ok_or_else(|| BitosError::usage("dpkg-query: no packages found matching"))?;
                format!(
                    "/usr/bin/{name}\n/usr/share/doc/{name}/README.Debian\n\
                     /usr/share/doc/{name}/changelog.Debian.gz\n\
                     /usr/share/doc/{name}/copyright\n/usr/share/man/man1/{name}.1.gz"
                )
            },
            "-S" | "--search" => {
                let pattern = rest
                    .first()
                    .ok_or_else(|| BitosError::usage("dpkg-query: no path found matching pattern"))?;
                if !pattern.contains("bin") {
                    return Err(BitosError::usage(format!(
                        "dpkg-query: no path found matching pattern {pattern}"
                    )));
                }
                "bash: /bin/bash\ncoreutils: /bin/ls\nfindutils: /usr/bin/find\ngrep: /bin/grep\nsed: /bin/sed"
                    .to_string()
            },
            "--print-architecture" => "amd64".to_string(),
            "--version" => {
                "Debian 'dpkg' package management program version 1.21.22 (amd64).".to_string()
            },
            "-?" | "--help" => DPKG_HELP.to_string(),
            _ => return Err(BitosError::usage(DPKG_NO_ACTION)),
        };
        Ok(CommandOutput::Text(text))
    }
}

// ---------------------------------------------------------------------------
// apt-cache
// ---------------------------------------------------------------------------

const APT_CACHE_HELP: &str = "apt-cache 2.6.1 (amd64)
Usage: apt-cache [options] command
       apt-cache [options] show pkg1 [pkg2 ...]

apt-cache queries and displays available information about installed
and installable packages. It works exclusively on the data acquired
into the local cache via the 'update' command of e.g. apt-get. The
displayed information may therefore be outdated if the last update was
too long ago, but in exchange apt-cache works independently of the
availability of the configured sources (e.g. offline).

Most used commands:
  showsrc - Show source records
  search - Search the package list for a regex pattern
  depends - Show raw dependency information for a package
  rdepends - Show reverse dependency information for a package
  show - Show a readable record for the package
  pkgnames - List the names of all packages in the system
  policy - Show policy settings

See apt-cache(8) for more information about the available commands.
                       This APT has Super Cow Powers.";

const POLICY: &str = "Package files:
 100 /var/lib/dpkg/status
     release a=now
 500 http://deb.debian.org/debian bookworm/main amd64 Packages
     release v=12.0,o=Debian,a=stable,n=bookworm,l=Debian,c=main,b=amd64
 500 http://security.debian.org/debian-security bookworm-security/main amd64 Packages
     release v=12,o=Debian,a=stable-security,n=bookworm-security,l=Debian-Security,c=main,b=amd64
 500 http://deb.debian.org/debian bookworm-updates/main amd64 Packages
     release o=Debian,a=stable-updates,n=bookworm-updates,l=Debian,c=main,b=amd64

Package pin: (not found)";

struct AptCacheCmd;
impl Command for AptCacheCmd {
    fn name(&self) -> &str {
        "apt-cache"
    }
    fn description(&self) -> &str {
        "Query the package cache"
    }
    fn usage(&self) -> &str {
        "apt-cache <search|show|depends|rdepends|policy|pkgnames> [package]"
    }
    fn category(&self) -> &str {
        "package"
    }
    fn manual(&self) -> Option<&str> {
        Some(APT_CACHE_HELP)
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some((&subcommand, rest)) = args.split_first() else {
            return Ok(CommandOutput::Text(APT_CACHE_HELP.to_string()));
        };
        let name = operand(rest);
        let require = |message: &str| required(rest, message);
        let text = match subcommand {
            "search" => {
                let t = require("E: No search term specified")?;
                [
                    format!("{t}base - {t} base package\n  {t}base is the core package for {t}"),
                    format!("lib{t} - {t} library package\n  This package provides the shared libraries for {t}"),
                    format!("{t}-utils - {t} utilities package\n  This package contains utilities for working with {t}"),
                    format!("python3-{t} - Python 3 bindings for {t}\n  This package provides Python 3 bindings for {t}"),
                    format!("{t}-dev - Development files for {t}\n  This package contains the header files and static libraries for {t}"),
                    format!("{t}-doc - Documentation for {t}\n  This package contains the documentation for {t}"),
                ]
                .join("\n\n")
            },
            "show" => package_record(require("E: No package name specified")?, true),
            "depends" => {
                let p = require("E: No package name specified")?;
                format!(
                    "{p}\n  Depends: libc6 (>= 2.34)\n  Depends: libgcc-s1 (>= 3.0)\n  \
                     Recommends: {p}-common\n  Suggests: {p}-doc"
                )
            },
            "rdepends" => {
                let p = require("E: No package name specified")?;
                format!("{p}\nReverse Depends:\n  {p}-utils\n  {p}-dev\n  lib{p}-dev")
            },
            "policy" => match name {
                None => POLICY.to_string(),
                Some(p) => ["stable", "stable-security", "stable-updates"]
                    .iter()
                    .map(|suite| format!("Package: {p}\nPin: release a={suite}\nPin-Priority: 500"))
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            },
            "pkgnames" => INSTALLED.iter().map(|p| p.name).collect::<Vec<_>>().join("\n"),
            other => return Err(BitosError::usage(format!("E: Invalid operation {other}"))),
        };
        Ok(CommandOutput::Text(text))
    }
}
