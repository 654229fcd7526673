//! Node-link export of the pathway graph.
//!
//! The document lists every node with its attributes and every edge as a
//! `{source, target, stoichio}` link, enough to rebuild the graph exactly.

use petgraph::visit::EdgeRef;
use rpgraph_core::{Result, SecondaryAnnotation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{PathwayGraph, PathwayNode};

/// Graph-level attributes of an exported pathway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentGraph {
    pub pathway_id: String,
    #[serde(default)]
    pub annotation: SecondaryAnnotation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLink {
    pub source: String,
    pub target: String,
    pub stoichio: f64,
}

/// Node-link document of a pathway graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkDocument {
    pub directed: bool,
    pub multigraph: bool,
    pub graph: DocumentGraph,
    pub nodes: Vec<PathwayNode>,
    pub links: Vec<NodeLink>,
}

impl PathwayGraph {
    /// Export nodes and links in insertion order.
    pub fn export_document(&self) -> NodeLinkDocument {
        let inner = self.inner();
        let nodes = inner
            .node_indices()
            .map(|idx| inner[idx].clone())
            .collect();
        let links = inner
            .edge_references()
            .map(|edge| NodeLink {
                source: inner[edge.source()].id().to_string(),
                target: inner[edge.target()].id().to_string(),
                stoichio: edge.weight().stoichiometry,
            })
            .collect();

        NodeLinkDocument {
            directed: true,
            multigraph: false,
            graph: DocumentGraph {
                pathway_id: self.pathway_id().to_string(),
                annotation: self.annotation().clone(),
            },
            nodes,
            links,
        }
    }

    /// Rebuild a graph from an exported document.
    ///
    /// Duplicate node ids, dangling links and links that do not join a
    /// species with a reaction are integrity errors.
    pub fn from_document(document: &NodeLinkDocument) -> Result<Self> {
        let mut graph = Self::empty(
            &document.graph.pathway_id,
            document.graph.annotation.clone(),
        );
        for node in &document.nodes {
            graph.insert_node(node.clone())?;
        }
        for link in &document.links {
            graph.insert_edge(&link.source, &link.target, link.stoichio)?;
        }
        debug!(
            "Rebuilt pathway graph {} from document: {} nodes, {} links",
            document.graph.pathway_id,
            document.nodes.len(),
            document.links.len()
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{build, linear_record};
    use rpgraph_core::Error;

    #[test]
    fn test_export_shape() {
        let graph = build(linear_record()).unwrap();
        let json = serde_json::to_value(graph.export_document()).unwrap();

        assert_eq!(json["directed"], true);
        assert_eq!(json["graph"]["pathway_id"], "rp_pathway");
        assert_eq!(json["nodes"].as_array().unwrap().len(), 6);
        assert_eq!(json["links"].as_array().unwrap().len(), 5);

        let a = &json["nodes"][0];
        assert_eq!(a["id"], "A");
        assert_eq!(a["type"], "species");
        assert_eq!(a["central_species"], true);
        assert_eq!(a["sink_species"], true);

        let r1 = json["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|n| n["id"] == "R1")
            .unwrap();
        assert_eq!(r1["type"], "reaction");
        assert_eq!(r1["miriam"]["ec-code"][0], "1.1.1.1");

        assert_eq!(json["links"][0]["source"], "A");
        assert_eq!(json["links"][0]["target"], "R1");
        assert_eq!(json["links"][0]["stoichio"], 1.0);
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut record = linear_record();
        record.group_annotations.insert(
            "rp_pathway".into(),
            serde_json::from_value(serde_json::json!({"global_score": 0.8})).unwrap(),
        );
        record.reactions[0].products[0].stoichiometry = 2.0;
        let graph = build(record).unwrap();
        let document = graph.export_document();

        let text = serde_json::to_string(&document).unwrap();
        let parsed: NodeLinkDocument = serde_json::from_str(&text).unwrap();
        let rebuilt = PathwayGraph::from_document(&parsed).unwrap();

        assert_eq!(rebuilt.stats(), graph.stats());
        assert_eq!(rebuilt.reaction_ids(), graph.reaction_ids());
        assert_eq!(rebuilt.stoichiometry("R1", "B"), Some(2.0));
        assert_eq!(rebuilt.annotation().other["global_score"], 0.8);
        assert_eq!(rebuilt.export_document(), document);
    }

    #[test]
    fn test_dangling_link_rejected() {
        let graph = build(linear_record()).unwrap();
        let mut document = graph.export_document();
        document.links.push(NodeLink {
            source: "R2".into(),
            target: "Z".into(),
            stoichio: 1.0,
        });
        assert!(matches!(
            PathwayGraph::from_document(&document),
            Err(Error::DataIntegrity(_))
        ));
    }

    #[test]
    fn test_species_to_species_link_rejected() {
        let graph = build(linear_record()).unwrap();
        let mut document = graph.export_document();
        document.links.push(NodeLink {
            source: "A".into(),
            target: "B".into(),
            stoichio: 1.0,
        });
        assert!(PathwayGraph::from_document(&document).is_err());
    }
}
