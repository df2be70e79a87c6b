//! Shared fixture for transformer tests: three players in a line and four languages.

use crate::common::messages::InboundChat;
use crate::common::types::{BlockPos, Location, PlayerId, PlayerProfile};
use crate::config::parser::load_config_str;
use crate::config::types::ChatConfig;
use crate::host::MemoryHost;
use crate::language::LanguageRegistry;
use crate::pipeline::{MessageContext, PipelineEnv, PipelineReport, PipelineState, Transformer, TransformerSystem};

const LANGUAGES: &str = r##"
languages = [
    { name = "Common", prefix = "co", syllables = ["ka", "lo", "ti"], default = true }
    { name = "Elvish", prefix = "el", color = "#88CC88", syllables = ["ae", "lor", "quen"] }
    { name = "Draconic", prefix = "dr", syllables = ["kra", "thos"], hidden = true }
    { name = "Handsign", prefix = "hs", syllables = ["~"], sign_language = true }
]
"##;

pub(crate) struct Fixture {
    pub host: MemoryHost,
    pub settings: ChatConfig,
    pub languages: LanguageRegistry,
}

impl Fixture {
    /// At (0, 64, 0), speaks Common.
    pub const ANN: PlayerId = 1;
    /// 10 blocks east, knows Elvish.
    pub const BOB: PlayerId = 2;
    /// 20 blocks east.
    pub const CAT: PlayerId = 3;

    pub fn new() -> Self {
        let config = load_config_str(LANGUAGES).unwrap();
        let languages = LanguageRegistry::from_config(&config).unwrap();
        let fixture = Self {
            host: MemoryHost::new(),
            settings: config.chat,
            languages,
        };
        fixture.add("Ann", Self::ANN, BlockPos::new(0, 64, 0));
        fixture.add("Bob", Self::BOB, BlockPos::new(10, 64, 0));
        fixture.add("Cat", Self::CAT, BlockPos::new(20, 64, 0));
        fixture.host.update_profile(Self::BOB, |p| {
            p.known_languages.insert("Elvish".to_string());
        });
        fixture
    }

    /// Add a Common-speaking player in world `w`.
    pub fn add(&self, name: &str, id: PlayerId, block: BlockPos) {
        let mut profile = PlayerProfile::new(name);
        profile.current_language = Some("Common".to_string());
        self.host.add_player(id, profile, Location::standing("w", block));
    }

    /// Run `steps` the way the orchestrator runs a phase.
    pub fn run(&self, steps: &[&dyn Transformer], ctx: &mut MessageContext) {
        let env = PipelineEnv {
            settings: &self.settings,
            languages: &self.languages,
            players: &self.host,
            world: &self.host,
        };
        for step in steps {
            if !step.should_apply(ctx) {
                continue;
            }
            if step.apply(ctx, &env).is_err() {
                ctx.fail();
            }
            if ctx.state != PipelineState::Continue {
                break;
            }
        }
    }

    pub fn process(&self, system: &TransformerSystem, inbound: InboundChat) -> PipelineReport {
        system.process(inbound, &self.host, &self.host, &self.host)
    }
}
