//! Concrete rule sets for Doxygen XML: the adjust recipe that canonicalizes
//! description trees and the render recipe that turns them into
//! reStructuredText.

pub mod adjuster;
pub mod inline;
pub mod renderer;
pub mod text;

use aerate_engine::{AerateResult, RenderEngine};
use aerate_tree::{NodeId, Tree};
use tracing::{debug, instrument};

/// Adjust the subtree at `node` in place, then render it
#[instrument(skip_all)]
pub fn aerate(tree: &mut Tree, node: NodeId, renderer: &RenderEngine) -> AerateResult<String> {
    debug!(tag = tree.tag(node), "Adjusting");
    adjuster::adjust(tree, node)?;
    renderer.render(tree, node, "")
}
