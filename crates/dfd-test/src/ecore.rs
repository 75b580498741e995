// Dweve DFD Bridge - Data Flow Diagram Analysis Backend
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Ecore diagram/dictionary pair text, as produced by the modeling toolchain.

/// Data flow diagram half of the pair.
pub const DIAGRAM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<dataflowdiagram:DataFlowDiagram xmi:version="2.0" xmlns:xmi="http://www.omg.org/XMI" xmlns:dataflowdiagram="http://dataflowanalysis.org/dfd/dataflowdiagram" id="dfd1">
  <nodes xsi:type="dataflowdiagram:External" id="user" entityName="User"/>
  <nodes xsi:type="dataflowdiagram:Process" id="process" entityName="Process"/>
  <flows id="flow1" entityName="data" sourceNode="user" destinationNode="process"/>
</dataflowdiagram:DataFlowDiagram>"#;

/// Data dictionary half of the pair.
pub const DICTIONARY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<datadictionary:DataDictionary xmi:version="2.0" xmlns:xmi="http://www.omg.org/XMI" xmlns:datadictionary="http://dataflowanalysis.org/dfd/datadictionary" id="dd1">
  <labelTypes id="sens" entityName="Sensitivity">
    <label id="personal" entityName="Personal"/>
  </labelTypes>
</datadictionary:DataDictionary>"#;
